//! Simplified Soundex codes for phonetic name comparison.

/// Four-character simplified Soundex code of `name`.
///
/// Returns an empty string when the input carries no ASCII letters, so a
/// pair of empty codes never counts as a phonetic match.
pub fn soundex(name: &str) -> String {
    let letters: Vec<char> = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let Some(&first) = letters.first() else {
        return String::new();
    };

    let mut code = String::new();
    code.push(first.to_ascii_uppercase());

    let mut last_digit = digit_for(first);
    for &c in &letters[1..] {
        let digit = digit_for(c);
        match digit {
            Some(d) => {
                if last_digit != Some(d) {
                    code.push(d);
                }
                last_digit = Some(d);
            }
            None => {
                // 'h' and 'w' are transparent in classic Soundex; this
                // simplified variant resets on every non-coded letter.
                last_digit = None;
            }
        }
        if code.len() == 4 {
            return code;
        }
    }

    while code.len() < 4 {
        code.push('0');
    }
    code
}

fn digit_for(c: char) -> Option<char> {
    match c {
        'b' | 'f' | 'p' | 'v' => Some('1'),
        'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => Some('2'),
        'd' | 't' => Some('3'),
        'l' => Some('4'),
        'm' | 'n' => Some('5'),
        'r' => Some('6'),
        _ => None,
    }
}
