// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All burn model code lives here. The pipeline only ever sees
// the TextClassifier and Translator traits from Layer 3.
//
//   model.rs       — architectures
//                    • token + position embeddings
//                    • encoder blocks (self-attention, GELU FFN)
//                    • decoder blocks (causal self-attention,
//                      cross-attention over the encoder output)
//                    • sequence classifier: encoder → mean pool → head
//                    • translation model: encoder-decoder, greedy decoding
//
//   classifier.rs  — loads a classifier directory, implements TextClassifier
//
//   translator.rs  — loads a translation directory, implements Translator
//
// Inference runs on the CPU ndarray backend.
//
// Reference: Burn Book §3 (Building Blocks)
//            Vaswani et al. (2017) Attention Is All You Need

/// Backend used for all inference
pub type InferBackend = burn::backend::NdArray;

/// Encoder / decoder architectures
pub mod model;

/// Pretrained sequence classifier
pub mod classifier;

/// Pretrained translation model
pub mod translator;
