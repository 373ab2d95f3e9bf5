use anyhow::{anyhow, Result};
use context_code_window::TokenEncoder;
use std::path::Path;
use tokenizers::Tokenizer;

/// Token counts from the completion model's own `tokenizer.json`
pub struct HfEncoder {
    tokenizer: Tokenizer,
}

impl HfEncoder {
    pub fn from_file(path: &Path) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| anyhow!("Tokenizer load failed for {}: {e}", path.display()))?;
        Ok(Self { tokenizer })
    }
}

impl TokenEncoder for HfEncoder {
    fn encode(&self, text: &str) -> Vec<u32> {
        match self.tokenizer.encode(text, false) {
            Ok(encoding) => encoding.get_ids().to_vec(),
            Err(e) => {
                log::warn!("Tokenization failed, counting as empty: {e}");
                Vec::new()
            }
        }
    }
}
