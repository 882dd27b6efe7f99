//! Byte-level audio fixtures shared by the library tests.

/// 16-bit mono PCM wave with `seconds` of silence, optionally carrying a bext chunk.
pub fn pcm_wave(seconds: u32, bext: Option<&str>) -> Vec<u8> {
    let rate: u32 = 8000;
    let data_len = rate * 2 * seconds;

    let mut fmt = Vec::new();
    fmt.extend_from_slice(&1u16.to_le_bytes()); // PCM
    fmt.extend_from_slice(&1u16.to_le_bytes()); // mono
    fmt.extend_from_slice(&rate.to_le_bytes());
    fmt.extend_from_slice(&(rate * 2).to_le_bytes());
    fmt.extend_from_slice(&2u16.to_le_bytes());
    fmt.extend_from_slice(&16u16.to_le_bytes());

    let mut body = b"WAVE".to_vec();
    body.extend_from_slice(b"fmt ");
    body.extend_from_slice(&(fmt.len() as u32).to_le_bytes());
    body.extend_from_slice(&fmt);
    if let Some(text) = bext {
        let mut field = text.as_bytes().to_vec();
        field.resize(602, 0);
        body.extend_from_slice(b"bext");
        body.extend_from_slice(&(field.len() as u32).to_le_bytes());
        body.extend_from_slice(&field);
    }
    body.extend_from_slice(b"data");
    body.extend_from_slice(&data_len.to_le_bytes());
    body.resize(body.len() + data_len as usize, 0);

    let mut out = b"RIFF".to_vec();
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}
