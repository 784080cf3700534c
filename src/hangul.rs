//! Hangul decomposition for jamo-level substring matching.
//!
//! A precomposed syllable such as `괜` is split into its initial, medial and
//! final jamo, and compound jamo are split once more into their components
//! (`ㅙ` → `ㅗㅐ`, `ㄶ` → `ㄴㅎ`). Double consonants (`ㄲ`, `ㅆ`, ...) stay whole
//! because they are typed as a single key. A half-typed query like `핔` then
//! decomposes to `ㅍㅣㅋ`, which is a prefix of `피카츄` (`ㅍㅣㅋㅏㅊㅠ`).

const SYLLABLE_BASE: u32 = 0xAC00;
const SYLLABLE_LAST: u32 = 0xD7A3;
const MEDIAL_COUNT: u32 = 21;
const FINAL_COUNT: u32 = 28;

const INITIALS: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ', 'ㅋ',
    'ㅌ', 'ㅍ', 'ㅎ',
];

const MEDIALS: [char; 21] = [
    'ㅏ', 'ㅐ', 'ㅑ', 'ㅒ', 'ㅓ', 'ㅔ', 'ㅕ', 'ㅖ', 'ㅗ', 'ㅘ', 'ㅙ', 'ㅚ', 'ㅛ', 'ㅜ', 'ㅝ', 'ㅞ',
    'ㅟ', 'ㅠ', 'ㅡ', 'ㅢ', 'ㅣ',
];

// Index 0 means "no final consonant".
const FINALS: [Option<char>; 28] = [
    None,
    Some('ㄱ'),
    Some('ㄲ'),
    Some('ㄳ'),
    Some('ㄴ'),
    Some('ㄵ'),
    Some('ㄶ'),
    Some('ㄷ'),
    Some('ㄹ'),
    Some('ㄺ'),
    Some('ㄻ'),
    Some('ㄼ'),
    Some('ㄽ'),
    Some('ㄾ'),
    Some('ㄿ'),
    Some('ㅀ'),
    Some('ㅁ'),
    Some('ㅂ'),
    Some('ㅄ'),
    Some('ㅅ'),
    Some('ㅆ'),
    Some('ㅇ'),
    Some('ㅈ'),
    Some('ㅊ'),
    Some('ㅋ'),
    Some('ㅌ'),
    Some('ㅍ'),
    Some('ㅎ'),
];

/// Components of a compound vowel or consonant cluster, if `jamo` is one.
pub fn split_compound(jamo: char) -> Option<[char; 2]> {
    let parts = match jamo {
        'ㅘ' => ['ㅗ', 'ㅏ'],
        'ㅙ' => ['ㅗ', 'ㅐ'],
        'ㅚ' => ['ㅗ', 'ㅣ'],
        'ㅝ' => ['ㅜ', 'ㅓ'],
        'ㅞ' => ['ㅜ', 'ㅔ'],
        'ㅟ' => ['ㅜ', 'ㅣ'],
        'ㅢ' => ['ㅡ', 'ㅣ'],
        'ㄳ' => ['ㄱ', 'ㅅ'],
        'ㄵ' => ['ㄴ', 'ㅈ'],
        'ㄶ' => ['ㄴ', 'ㅎ'],
        'ㄺ' => ['ㄹ', 'ㄱ'],
        'ㄻ' => ['ㄹ', 'ㅁ'],
        'ㄼ' => ['ㄹ', 'ㅂ'],
        'ㄽ' => ['ㄹ', 'ㅅ'],
        'ㄾ' => ['ㄹ', 'ㅌ'],
        'ㄿ' => ['ㄹ', 'ㅍ'],
        'ㅀ' => ['ㄹ', 'ㅎ'],
        'ㅄ' => ['ㅂ', 'ㅅ'],
        _ => return None,
    };
    Some(parts)
}

pub fn is_syllable(ch: char) -> bool {
    (SYLLABLE_BASE..=SYLLABLE_LAST).contains(&(ch as u32))
}

/// Jamo of a single precomposed syllable, before compound splitting.
pub fn syllable_jamo(ch: char) -> Option<(char, char, Option<char>)> {
    if !is_syllable(ch) {
        return None;
    }
    let index = ch as u32 - SYLLABLE_BASE;
    let initial = INITIALS[(index / (MEDIAL_COUNT * FINAL_COUNT)) as usize];
    let medial = MEDIALS[((index % (MEDIAL_COUNT * FINAL_COUNT)) / FINAL_COUNT) as usize];
    let last = FINALS[(index % FINAL_COUNT) as usize];
    Some((initial, medial, last))
}

/// Decompose `text` into its comparison units.
///
/// Hangul syllables and compatibility jamo become their minimal jamo; every
/// other character is lowercased and kept as-is.
pub fn decompose(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 3);
    for ch in text.chars() {
        match syllable_jamo(ch) {
            Some((initial, medial, last)) => {
                push_jamo(&mut out, initial);
                push_jamo(&mut out, medial);
                if let Some(last) = last {
                    push_jamo(&mut out, last);
                }
            }
            None => {
                if split_compound(ch).is_some() {
                    push_jamo(&mut out, ch);
                } else {
                    out.extend(ch.to_lowercase());
                }
            }
        }
    }
    out
}

fn push_jamo(out: &mut String, jamo: char) {
    match split_compound(jamo) {
        Some(parts) => out.extend(parts),
        None => out.push(jamo),
    }
}
