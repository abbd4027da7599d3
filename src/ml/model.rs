use burn::{
    nn::{
        attention::{generate_autoregressive_mask, MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

use crate::data::batcher::TokenBatch;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally; deriving them again gives conflicting impls.
#[derive(Config, Debug)]
pub struct SequenceClassifierConfig {
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    pub num_classes: usize,
    #[config(default = 0)]
    pub pad_id:      u32,
    #[config(default = 0.0)]
    pub dropout:     f64,
}

impl SequenceClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SequenceClassifier<B> {
        let embedding = TokenEmbedding::new(self.vocab_size, self.max_seq_len, self.d_model, device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| EncoderBlock::new(self.d_model, self.num_heads, self.d_ff, self.dropout, device))
            .collect();
        let final_norm = LayerNormConfig::new(self.d_model).init(device);
        let head       = LinearConfig::new(self.d_model, self.num_classes).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        SequenceClassifier { embedding, layers, final_norm, head, dropout }
    }
}

#[derive(Config, Debug)]
pub struct TranslationModelConfig {
    pub vocab_size:         usize,
    pub max_seq_len:        usize,
    pub d_model:            usize,
    pub num_heads:          usize,
    pub num_encoder_layers: usize,
    pub num_decoder_layers: usize,
    pub d_ff:               usize,
    pub pad_id:             u32,
    pub eos_id:             u32,
    /// First token fed to the decoder (Marian-style models reuse the pad id)
    pub decoder_start_id:   u32,
    #[config(default = 0.0)]
    pub dropout:            f64,
}

impl TranslationModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TranslationModel<B> {
        let embedding = TokenEmbedding::new(self.vocab_size, self.max_seq_len, self.d_model, device);
        let encoder: Vec<EncoderBlock<B>> = (0..self.num_encoder_layers)
            .map(|_| EncoderBlock::new(self.d_model, self.num_heads, self.d_ff, self.dropout, device))
            .collect();
        let decoder: Vec<DecoderBlock<B>> = (0..self.num_decoder_layers)
            .map(|_| DecoderBlock::new(self.d_model, self.num_heads, self.d_ff, self.dropout, device))
            .collect();
        let encoder_norm = LayerNormConfig::new(self.d_model).init(device);
        let decoder_norm = LayerNormConfig::new(self.d_model).init(device);
        let lm_head      = LinearConfig::new(self.d_model, self.vocab_size).init(device);
        TranslationModel {
            embedding, encoder, decoder, encoder_norm, decoder_norm, lm_head,
            max_seq_len:      self.max_seq_len,
            eos_id:           self.eos_id,
            decoder_start_id: self.decoder_start_id,
        }
    }
}

// ─── Shared building blocks ───────────────────────────────────────────────────

#[derive(Module, Debug)]
pub struct TokenEmbedding<B: Backend> {
    pub token:    Embedding<B>,
    pub position: Embedding<B>,
}

impl<B: Backend> TokenEmbedding<B> {
    fn new(vocab_size: usize, max_seq_len: usize, d_model: usize, device: &B::Device) -> Self {
        Self {
            token:    EmbeddingConfig::new(vocab_size, d_model).init(device),
            position: EmbeddingConfig::new(max_seq_len, d_model).init(device),
        }
    }

    /// input_ids: [batch, seq_len] → [batch, seq_len, d_model]
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let [batch_size, seq_len] = input_ids.dims();
        let tok_emb = self.token.forward(input_ids);

        // Self-attention is permutation-invariant, so position must be injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        tok_emb + self.position.forward(positions)
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    fn new(d_model: usize, num_heads: usize, d_ff: usize, dropout: f64, device: &B::Device) -> Self {
        Self {
            self_attn: MultiHeadAttentionConfig::new(d_model, num_heads)
                .with_dropout(dropout)
                .init(device),
            ffn_linear1: LinearConfig::new(d_model, d_ff).init(device),
            ffn_linear2: LinearConfig::new(d_ff, d_model).init(device),
            norm1:       LayerNormConfig::new(d_model).init(device),
            norm2:       LayerNormConfig::new(d_model).init(device),
            dropout:     DropoutConfig::new(dropout).init(),
        }
    }

    pub fn forward(&self, x: Tensor<B, 3>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attn_output = self
            .self_attn
            .forward(MhaInput::self_attn(x.clone()).mask_pad(mask_pad))
            .context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct DecoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub cross_attn:  MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub norm3:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> DecoderBlock<B> {
    fn new(d_model: usize, num_heads: usize, d_ff: usize, dropout: f64, device: &B::Device) -> Self {
        let attn = || {
            MultiHeadAttentionConfig::new(d_model, num_heads)
                .with_dropout(dropout)
                .init(device)
        };
        Self {
            self_attn:   attn(),
            cross_attn:  attn(),
            ffn_linear1: LinearConfig::new(d_model, d_ff).init(device),
            ffn_linear2: LinearConfig::new(d_ff, d_model).init(device),
            norm1:       LayerNormConfig::new(d_model).init(device),
            norm2:       LayerNormConfig::new(d_model).init(device),
            norm3:       LayerNormConfig::new(d_model).init(device),
            dropout:     DropoutConfig::new(dropout).init(),
        }
    }

    /// x: [batch, tgt_len, d_model], memory: [batch, src_len, d_model]
    pub fn forward(
        &self,
        x:          Tensor<B, 3>,
        memory:     Tensor<B, 3>,
        memory_pad: Tensor<B, 2, Bool>,
    ) -> Tensor<B, 3> {
        let [batch_size, tgt_len, _] = x.dims();

        // Position t may only attend to positions <= t.
        let causal = generate_autoregressive_mask::<B>(batch_size, tgt_len, &x.device());
        let attn_output = self
            .self_attn
            .forward(MhaInput::self_attn(x.clone()).mask_attn(causal))
            .context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));

        let cross_output = self
            .cross_attn
            .forward(MhaInput::new(x.clone(), memory.clone(), memory).mask_pad(memory_pad))
            .context;
        let x = self.norm2.forward(x + self.dropout.forward(cross_output));

        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm3.forward(x + self.dropout.forward(ffn_out))
    }
}

// ─── Sequence classifier ──────────────────────────────────────────────────────

#[derive(Module, Debug)]
pub struct SequenceClassifier<B: Backend> {
    pub embedding:  TokenEmbedding<B>,
    pub layers:     Vec<EncoderBlock<B>>,
    pub final_norm: LayerNorm<B>,
    pub head:       Linear<B>,
    pub dropout:    Dropout,
}

impl<B: Backend> SequenceClassifier<B> {
    /// → logits: [batch, num_classes]
    pub fn forward(&self, batch: &TokenBatch<B>) -> Tensor<B, 2> {
        let mut x = self.dropout.forward(self.embedding.forward(batch.input_ids.clone()));
        for layer in &self.layers {
            x = layer.forward(x, batch.mask_pad.clone());
        }
        let x = self.final_norm.forward(x); // [batch, seq_len, d_model]

        // Mean over real (non-padding) positions only.
        let [batch_size, seq_len, d_model] = x.dims();
        let mask = batch
            .attention_mask
            .clone()
            .float()
            .reshape([batch_size, seq_len, 1])
            .expand([batch_size, seq_len, d_model]);
        let summed = (x * mask.clone()).sum_dim(1).reshape([batch_size, d_model]);
        let counts = mask.sum_dim(1).reshape([batch_size, d_model]).clamp_min(1.0);

        self.head.forward(summed / counts)
    }

    /// Most probable class index per row.
    pub fn predict(&self, batch: &TokenBatch<B>) -> Vec<i64> {
        let probs = burn::tensor::activation::softmax(self.forward(batch), 1);
        probs.argmax(1).into_data().iter::<i64>().collect()
    }
}

// ─── Translation model ────────────────────────────────────────────────────────

#[derive(Module, Debug)]
pub struct TranslationModel<B: Backend> {
    pub embedding:        TokenEmbedding<B>,
    pub encoder:          Vec<EncoderBlock<B>>,
    pub decoder:          Vec<DecoderBlock<B>>,
    pub encoder_norm:     LayerNorm<B>,
    pub decoder_norm:     LayerNorm<B>,
    pub lm_head:          Linear<B>,
    pub max_seq_len:      usize,
    pub eos_id:           u32,
    pub decoder_start_id: u32,
}

impl<B: Backend> TranslationModel<B> {
    /// → memory: [batch, src_len, d_model]
    pub fn encode(&self, batch: &TokenBatch<B>) -> Tensor<B, 3> {
        let mut x = self.embedding.forward(batch.input_ids.clone());
        for layer in &self.encoder {
            x = layer.forward(x, batch.mask_pad.clone());
        }
        self.encoder_norm.forward(x)
    }

    /// → logits: [batch, tgt_len, vocab_size]
    pub fn decode(
        &self,
        target_ids: Tensor<B, 2, Int>,
        memory:     Tensor<B, 3>,
        memory_pad: Tensor<B, 2, Bool>,
    ) -> Tensor<B, 3> {
        let mut x = self.embedding.forward(target_ids);
        for layer in &self.decoder {
            x = layer.forward(x, memory.clone(), memory_pad.clone());
        }
        self.lm_head.forward(self.decoder_norm.forward(x))
    }

    /// Greedy decoding: at every step append the most probable next token,
    /// until each row has produced end-of-sequence or `max_len` tokens.
    /// The returned ids exclude the start and end tokens.
    pub fn greedy_decode(&self, batch: &TokenBatch<B>, max_len: usize) -> Vec<Vec<u32>> {
        let [batch_size, _] = batch.input_ids.dims();
        let memory = self.encode(batch);
        let device = memory.device();

        // The start token occupies one position embedding slot.
        let max_steps = max_len.min(self.max_seq_len.saturating_sub(1));

        let mut target = Tensor::<B, 2, Int>::full(
            [batch_size, 1], self.decoder_start_id as i64, &device,
        );
        let mut generated: Vec<Vec<u32>> = vec![Vec::new(); batch_size];
        let mut finished = vec![false; batch_size];

        for _ in 0..max_steps {
            let [_, tgt_len] = target.dims();
            let logits = self.decode(target.clone(), memory.clone(), batch.mask_pad.clone());
            let [_, _, vocab_size] = logits.dims();

            let last = logits
                .slice([0..batch_size, tgt_len - 1..tgt_len, 0..vocab_size])
                .reshape([batch_size, vocab_size]);
            let next = last.argmax(1); // [batch, 1]

            let ids: Vec<i64> = next.clone().into_data().iter::<i64>().collect();
            for (row, &id) in ids.iter().enumerate() {
                if finished[row] {
                    continue;
                }
                if id as u32 == self.eos_id {
                    finished[row] = true;
                } else {
                    generated[row].push(id as u32);
                }
            }

            if finished.iter().all(|&f| f) {
                break;
            }
            target = Tensor::cat(vec![target, next], 1);
        }

        generated
    }
}
