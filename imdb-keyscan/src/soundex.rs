/// The maximum length of a soundex code: one letter followed by at most four
/// digits.
const SOUNDEX_LEN: usize = 5;

/// Digit groups for `A` through `Z`. Letters that are not coded map to `0`.
const GROUPS: &[u8; 26] = b"01230120022455012623010202";

/// Return the soundex code of the given string.
///
/// Only ASCII letters are considered, regardless of case. The code starts
/// with the first letter, uppercased, followed by the group digit of each
/// following letter. Uncoded letters (vowels, `H`, `W` and `Y`) are dropped,
/// and so is any digit equal to the one emitted just before it. At most four
/// digits are emitted.
///
/// If the string contains no ASCII letters, then `None` is returned.
pub fn soundex(text: &str) -> Option<String> {
    let mut letters = text
        .bytes()
        .filter(|b| b.is_ascii_alphabetic())
        .map(|b| b.to_ascii_uppercase());
    let first = letters.next()?;

    let mut code = vec![first];
    for letter in letters {
        if code.len() >= SOUNDEX_LEN {
            break;
        }
        let digit = GROUPS[(letter - b'A') as usize];
        if digit != b'0' && Some(&digit) != code.last() {
            code.push(digit);
        }
    }
    String::from_utf8(code).ok()
}
