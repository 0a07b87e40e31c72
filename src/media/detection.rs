use crate::error::TransportError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// MIME type assumed when the frame signature is not recognised.
pub const DEFAULT_FRAME_MIME: &str = "image/jpeg";

/// Sniff the image format from magic bytes, falling back to JPEG.
#[must_use]
pub fn detect_image_mime(data: &[u8]) -> String {
    infer::get(data)
        .filter(|info| info.matcher_type() == infer::MatcherType::Image)
        .map_or_else(
            || DEFAULT_FRAME_MIME.to_string(),
            |info| info.mime_type().to_string(),
        )
}

/// Decode a base64 frame, accepting an optional `data:<mime>;base64,` prefix.
pub fn decode_frame_payload(payload: &str) -> Result<Vec<u8>, TransportError> {
    let trimmed = payload.trim();
    let encoded = if trimmed.starts_with("data:") {
        trimmed
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| TransportError::InvalidFrame("data URL without payload".into()))?
    } else {
        trimmed
    };

    if encoded.is_empty() {
        return Err(TransportError::InvalidFrame("empty image payload".into()));
    }

    STANDARD
        .decode(encoded)
        .map_err(|error| TransportError::InvalidFrame(format!("invalid base64: {error}")))
}
