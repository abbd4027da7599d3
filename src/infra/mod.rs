// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting file concerns that don't belong to any one
// pipeline stage:
//
//   checkpoint.rs  — Pretrained model directories
//                    Reads the burn model config (JSON), the
//                    tokenizer definition and the weights
//                    written by CompactRecorder.
//
//   metrics.rs     — Translation score report
//                    Writes one CSV row of BLEU / chrF / METEOR
//                    per candidate corpus.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Pretrained model directory loading
pub mod checkpoint;

/// Score report CSV writer
pub mod metrics;
