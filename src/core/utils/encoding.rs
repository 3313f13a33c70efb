use percent_encoding::{percent_encode, AsciiSet, CONTROLS};

/// https://url.spec.whatwg.org/#fragment-percent-encode-set
const FRAGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');

/// https://url.spec.whatwg.org/#path-percent-encode-set
const PATH: &AsciiSet = &FRAGMENT.add(b'#').add(b'?').add(b'{').add(b'}');

/// https://url.spec.whatwg.org/#userinfo-percent-encode-set
const USERINFO: &AsciiSet = &PATH
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'=')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'|');

/// https://url.spec.whatwg.org/#component-percent-encode-set
const COMPONENT: &AsciiSet = &USERINFO
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b',');

/// Encode single query parameter name or value, or form field.
pub fn url_encode(data: &[u8]) -> String {
    percent_encode(data, COMPONENT).to_string()
}

#[cfg(test)]
mod should {
    use super::*;
    use test_case::test_case;

    #[test_case("plain", "plain" ; "unreserved")]
    #[test_case("a b", "a%20b" ; "space")]
    #[test_case("a&b=c", "a%26b%3Dc" ; "pair separators")]
    #[test_case("1+1%", "1%2B1%25" ; "plus and percent")]
    #[test_case("x/y?z#w", "x%2Fy%3Fz%23w" ; "url delimiters")]
    fn encode_query_component(input: &str, expected: &str) {
        assert_eq!(url_encode(input.as_bytes()), expected);
    }
}
