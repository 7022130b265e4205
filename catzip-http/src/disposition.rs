/// `Content-Disposition` value for a download, with the file name encoded per
/// RFC 5987 so non-ASCII category names survive.
pub fn attachment(filename: &str) -> String {
    format!("attachment; filename*=UTF-8''{}", encode_rfc5987(filename))
}

fn encode_rfc5987(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}
