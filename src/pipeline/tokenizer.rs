//! Token counting for chunk sizing.
//!
//! The chunker only needs to turn text into a token sequence and turn a
//! contiguous window of that sequence back into text. Keeping that behind
//! [`Tokenizer`] lets the encoding be chosen at run time and lets tests use
//! a trivially predictable scheme.

use crate::config::TokenEncoding;
use crate::error::ChunkError;
use tiktoken_rs::CoreBPE;

/// Encodes text into tokens and decodes token windows back into text.
pub trait Tokenizer: Send + Sync {
    /// Encode `text` into its token sequence.
    fn encode(&self, text: &str) -> Vec<u32>;

    /// Decode a contiguous window of tokens.
    ///
    /// Returns `None` when the window does not decode to valid UTF-8, which
    /// happens with byte-level encodings when a boundary falls inside a
    /// multi-byte character.
    fn decode(&self, tokens: &[u32]) -> Option<String>;

    /// Number of tokens in `text`.
    fn count(&self, text: &str) -> usize {
        self.encode(text).len()
    }
}

/// A [`Tokenizer`] backed by one of the tiktoken byte-pair encodings.
pub struct TiktokenTokenizer {
    bpe: CoreBPE,
    encoding: TokenEncoding,
}

impl TiktokenTokenizer {
    /// Load the BPE ranks for `encoding`.
    pub fn new(encoding: TokenEncoding) -> Result<Self, ChunkError> {
        let bpe = match encoding {
            TokenEncoding::R50kBase => tiktoken_rs::r50k_base(),
            TokenEncoding::P50kBase => tiktoken_rs::p50k_base(),
            TokenEncoding::P50kEdit => tiktoken_rs::p50k_edit(),
            TokenEncoding::Cl100kBase => tiktoken_rs::cl100k_base(),
            TokenEncoding::O200kBase => tiktoken_rs::o200k_base(),
        }
        .map_err(|e| ChunkError::Tokenization(format!("loading {encoding}: {e}")))?;

        Ok(Self { bpe, encoding })
    }

    pub fn encoding(&self) -> TokenEncoding {
        self.encoding
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        // Special-token text such as "<|endoftext|>" inside a PDF is just text.
        self.bpe.encode_ordinary(text)
    }

    fn decode(&self, tokens: &[u32]) -> Option<String> {
        self.bpe.decode(tokens.to_vec()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p50k_round_trips_ascii() {
        let tok = TiktokenTokenizer::new(TokenEncoding::P50kBase).unwrap();
        let text = "The quick brown fox jumps over the lazy dog.";
        let tokens = tok.encode(text);
        assert!(!tokens.is_empty());
        assert!(tokens.len() < text.len());
        assert_eq!(tok.decode(&tokens).as_deref(), Some(text));
        assert_eq!(tok.count(text), tokens.len());
    }

    #[test]
    fn special_token_text_is_ordinary() {
        let tok = TiktokenTokenizer::new(TokenEncoding::Cl100kBase).unwrap();
        let text = "before <|endoftext|> after";
        assert_eq!(tok.decode(&tok.encode(text)).as_deref(), Some(text));
    }

    #[test]
    fn every_encoding_loads() {
        for enc in [
            TokenEncoding::R50kBase,
            TokenEncoding::P50kBase,
            TokenEncoding::P50kEdit,
            TokenEncoding::Cl100kBase,
            TokenEncoding::O200kBase,
        ] {
            let tok = TiktokenTokenizer::new(enc).unwrap();
            assert_eq!(tok.encoding(), enc);
            assert!(tok.count("hello world") >= 2);
        }
    }
}
