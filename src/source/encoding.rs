use encoding_rs::Encoding;

use crate::error::LoadError;

/// Decode `bytes` with the first candidate that accepts the whole input.
///
/// A byte-order mark wins if its encoding is one of the candidates; the mark
/// itself is stripped.
pub fn decode(
    bytes: &[u8],
    candidates: &[&'static Encoding],
) -> Result<(String, &'static Encoding), LoadError> {
    if let Some((enc, bom_len)) = Encoding::for_bom(bytes) {
        if candidates.contains(&enc) {
            if let Some(text) =
                enc.decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
            {
                return Ok((text.into_owned(), enc));
            }
        }
    }

    for &enc in candidates {
        if let Some(text) = enc.decode_without_bom_handling_and_without_replacement(bytes) {
            return Ok((text.into_owned(), enc));
        }
    }

    let tried = candidates
        .iter()
        .map(|e| e.name())
        .collect::<Vec<_>>()
        .join(", ");
    Err(LoadError::Encoding { tried })
}
