/// Fills each `%s` of `template` with the next percent-escaped segment.
///
/// IDs often come from user input; escaping keeps a stray `/` or `?` from
/// changing which endpoint is called. Placeholders without a matching segment
/// are left as-is and surplus segments are ignored.
#[must_use]
pub fn format_url_path(template: &str, segments: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut segments = segments.iter();
    let mut pieces = template.split("%s").peekable();

    while let Some(piece) = pieces.next() {
        out.push_str(piece);
        if pieces.peek().is_none() {
            break;
        }
        match segments.next() {
            Some(segment) => out.push_str(&urlencoding::encode(segment)),
            None => out.push_str("%s"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_each_segment() {
        assert_eq!(
            format_url_path("/v1/customers/%s/sources/%s", &["cus_1", "src/../x"]),
            "/v1/customers/cus_1/sources/src%2F..%2Fx"
        );
    }

    #[test]
    fn leaves_unmatched_placeholders() {
        assert_eq!(format_url_path("/v1/%s/%s", &["a"]), "/v1/a/%s");
        assert_eq!(format_url_path("/v1/plain", &["ignored"]), "/v1/plain");
    }
}
