use unicode_segmentation::UnicodeSegmentation;

/// Text → token-id encoder.
///
/// The same encoder must be used for a whole request so that window sizes,
/// similarity scores and budget costs stay comparable.
pub trait TokenEncoder: Send + Sync {
    fn encode(&self, text: &str) -> Vec<u32>;

    fn count(&self, text: &str) -> usize {
        self.encode(text).len()
    }
}

/// Tokenizer-free encoder over Unicode word boundaries.
///
/// Every word and punctuation segment becomes one token, whitespace runs are
/// dropped unless they break a line. Ids are FNV-1a hashes of the segment so
/// identical text always maps to identical ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalEncoder;

impl LexicalEncoder {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

fn fnv1a(segment: &str) -> u32 {
    segment.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

impl TokenEncoder for LexicalEncoder {
    fn encode(&self, text: &str) -> Vec<u32> {
        text.split_word_bounds()
            .filter_map(|segment| {
                if segment.trim().is_empty() {
                    // newlines stay countable so every added line costs a token
                    segment.contains('\n').then(|| fnv1a("\n"))
                } else {
                    Some(fnv1a(segment))
                }
            })
            .collect()
    }
}

impl<T: TokenEncoder + ?Sized> TokenEncoder for &T {
    fn encode(&self, text: &str) -> Vec<u32> {
        (**self).encode(text)
    }

    fn count(&self, text: &str) -> usize {
        (**self).count(text)
    }
}

impl<T: TokenEncoder + ?Sized> TokenEncoder for std::sync::Arc<T> {
    fn encode(&self, text: &str) -> Vec<u32> {
        (**self).encode(text)
    }

    fn count(&self, text: &str) -> usize {
        (**self).count(text)
    }
}
