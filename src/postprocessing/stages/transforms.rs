//! Finishing transforms offered on recognized text after cleanup

use serde::{Deserialize, Serialize};

/// Digits OCR tends to produce for stylized comic lettering
const DIGIT_LOOKALIKES: [(char, char); 10] = [
    ('1', 'I'),
    ('5', 'S'),
    ('0', 'O'),
    ('2', 'Z'),
    ('3', 'E'),
    ('4', 'A'),
    ('6', 'G'),
    ('7', 'T'),
    ('8', 'B'),
    ('9', 'g'),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    SingleLine,
    LowerCase,
    UpperCase,
}

impl std::str::FromStr for Transform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "single_line" => Ok(Transform::SingleLine),
            "lower_case" | "lower" => Ok(Transform::LowerCase),
            "upper_case" | "upper" => Ok(Transform::UpperCase),
            other => Err(format!("unknown transform '{}'", other)),
        }
    }
}

impl Transform {
    pub fn apply(self, text: &str) -> String {
        match self {
            Transform::SingleLine => single_line(text),
            Transform::LowerCase => lower_case(text),
            Transform::UpperCase => text.to_uppercase(),
        }
    }
}

/// Swap digits for the letters they usually stand in for
pub fn manhwa_digit_corrections(text: &str) -> String {
    text.chars()
        .map(|c| {
            DIGIT_LOOKALIKES
                .iter()
                .find(|(digit, _)| *digit == c)
                .map_or(c, |(_, letter)| *letter)
        })
        .collect()
}

pub fn single_line(text: &str) -> String {
    manhwa_digit_corrections(text).replace('\n', " ")
}

pub fn lower_case(text: &str) -> String {
    manhwa_digit_corrections(text).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_corrections() {
        assert_eq!(manhwa_digit_corrections("1 5AW 7HE 8O9"), "I SAW THE BOg");
    }

    #[test]
    fn test_transforms() {
        assert_eq!(Transform::SingleLine.apply("HE11O\nW0RLD"), "HEIIO WORLD");
        assert_eq!(Transform::LowerCase.apply("WH4T 1S"), "what is");
        assert_eq!(Transform::UpperCase.apply("r2d2\nok"), "R2D2\nOK");
    }

    #[test]
    fn test_transform_from_str() {
        assert_eq!("single-line".parse::<Transform>(), Ok(Transform::SingleLine));
        assert!("title".parse::<Transform>().is_err());
    }
}
