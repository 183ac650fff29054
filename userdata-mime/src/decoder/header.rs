use nom::{
    bytes::complete::{tag, tag_no_case, take_till1, take_while},
    sequence::{preceded, terminated, tuple},
    IResult,
};

/// `Content-Type:` (any case, any run of spaces) up to the `/`, yielding the
/// main type
pub fn content_type_main(line: &str) -> IResult<&str, &str> {
    preceded(
        tuple((tag_no_case("Content-Type:"), take_while(|c: char| c == ' '))),
        terminated(take_till1(|c: char| c == '/'), tag("/")),
    )(line)
}

/// A `Content-Transfer-Encoding: base64` line with nothing else on it
pub fn is_base64_encoding(line: &str) -> bool {
    let parsed: IResult<&str, &str> = tag_no_case("Content-Transfer-Encoding: base64")(line);
    matches!(parsed, Ok((rest, _)) if rest.is_empty() || rest == "\n")
}
