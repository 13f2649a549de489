//! Dice notation parser.
//!
//! Grammar: `term (("+" | "-") term)*` where a term is an integer, `d20` /
//! `1d20` (a single die), or `NdM` optionally followed by `kh` or `kl`.
//! Whitespace around signs and terms is ignored.
//!
//! Sets hold at most [`MAX_DICE`] dice of at most [`MAX_DIE_SIZE`] faces, and
//! the bounds of the whole expression must fit in an `i32`.

use super::distribute::{self, Spread};
use super::element::{
    Die, DieSet, Element, Flat, Keep, Pool, Range, Sign, MAX_DICE, MAX_DIE_SIZE,
};
use thiserror::Error;

/// Error type for dice notation parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty dice expression")]
    Empty,
    #[error("Invalid dice term: {segment:?}")]
    InvalidTerm { segment: String },
    #[error("Missing term after sign at position {position}")]
    MissingTerm { position: usize },
}

/// Options for [`parse_with`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Aggregate to reconstruct through the value distributor.
    pub value: Option<i32>,
    /// Explicit per-element values; takes precedence over `value`.
    pub values: Option<Vec<i32>>,
    /// DC the pool is compared against.
    pub target: Option<i32>,
    /// How keep-all die sets split their share.
    pub spread: Spread,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, value: i32) -> Self {
        self.value = Some(value);
        self
    }

    pub fn values(mut self, values: Vec<i32>) -> Self {
        self.values = Some(values);
        self
    }

    pub fn target(mut self, target: i32) -> Self {
        self.target = Some(target);
        self
    }

    pub fn spread(mut self, spread: Spread) -> Self {
        self.spread = spread;
        self
    }
}

/// A sign-resolved term before it becomes an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Term {
    Flat(i32),
    Die { size: u32 },
    DieSet { length: u32, size: u32, keep: Keep },
}

impl Term {
    fn build(self, sign: Sign) -> Element {
        match self {
            Term::Flat(value) => Flat::new(value).with_sign(sign).into(),
            Term::Die { size } => Die::new(size).with_sign(sign).into(),
            Term::DieSet { length, size, keep } => {
                DieSet::new(length, size, keep).with_sign(sign).into()
            }
        }
    }

    fn range(self, sign: Sign) -> Range {
        match self {
            Term::Flat(value) => {
                let value = sign.apply(value);
                Range::new(value, value)
            }
            Term::Die { size } => Range::of_dice(sign, 1, size),
            Term::DieSet { length, size, keep } => match keep {
                Keep::All => Range::of_dice(sign, length, size),
                Keep::Highest | Keep::Lowest => Range::of_dice(sign, 1, size),
            },
        }
    }
}

/// Parse a dice expression into an unrolled pool.
pub fn parse(expression: &str) -> Result<Pool, ParseError> {
    parse_with(expression, &ParseOptions::default())
}

/// Parse a dice expression, optionally pre-assigning element values.
///
/// When `values` or `value` is given the pool comes back fully assigned and
/// no randomness is involved, which is how a recorded roll is replayed.
pub fn parse_with(expression: &str, options: &ParseOptions) -> Result<Pool, ParseError> {
    let terms = tokenize(expression)?;
    let elements: Vec<Element> = terms
        .into_iter()
        .map(|(sign, term)| term.build(sign))
        .collect();

    let values = match (&options.values, options.value) {
        (Some(values), _) => values.clone(),
        (None, Some(value)) => distribute::distribute_over(&elements, value),
        (None, None) => Vec::new(),
    };

    let mut pool = Pool::new(elements).with_target(options.target);
    if !values.is_empty() {
        pool.assign_each(&values, options.spread);
    }
    Ok(pool)
}

fn tokenize(expression: &str) -> Result<Vec<(Sign, Term)>, ParseError> {
    let expression = expression.to_lowercase();
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut sign = Sign::Plus;
    let mut signed = false;
    let mut bounds = Range::new(0, 0);

    for (position, ch) in expression.char_indices() {
        match ch {
            '+' | '-' => {
                let segment = current.trim();
                if segment.is_empty() {
                    // Only a leading sign may stand without a term before it.
                    if signed || !terms.is_empty() {
                        return Err(ParseError::MissingTerm { position });
                    }
                } else {
                    push_term(&mut terms, &mut bounds, sign, segment)?;
                    current.clear();
                }
                sign = if ch == '+' { Sign::Plus } else { Sign::Minus };
                signed = true;
            }
            _ => current.push(ch),
        }
    }

    let segment = current.trim();
    if segment.is_empty() {
        return Err(if signed {
            ParseError::MissingTerm {
                position: expression.len(),
            }
        } else {
            ParseError::Empty
        });
    }
    push_term(&mut terms, &mut bounds, sign, segment)?;
    Ok(terms)
}

/// Parse `segment` and add it to `terms`, rejecting it if the running
/// expression bounds would overflow.
fn push_term(
    terms: &mut Vec<(Sign, Term)>,
    bounds: &mut Range,
    sign: Sign,
    segment: &str,
) -> Result<(), ParseError> {
    let term = parse_term(segment)?;
    *bounds = bounds
        .checked_add(term.range(sign))
        .ok_or_else(|| ParseError::InvalidTerm {
            segment: segment.to_string(),
        })?;
    terms.push((sign, term));
    Ok(())
}

fn parse_term(segment: &str) -> Result<Term, ParseError> {
    let invalid = || ParseError::InvalidTerm {
        segment: segment.to_string(),
    };

    let Some(d_pos) = segment.find('d') else {
        let value = parse_digits(segment).ok_or_else(invalid)?;
        return i32::try_from(value).map(Term::Flat).map_err(|_| invalid());
    };

    let count_str = &segment[..d_pos];
    let rest = &segment[d_pos + 1..];
    let (sides_str, keep) = if let Some(sides) = rest.strip_suffix("kh") {
        (sides, Keep::Highest)
    } else if let Some(sides) = rest.strip_suffix("kl") {
        (sides, Keep::Lowest)
    } else {
        (rest, Keep::All)
    };

    let size = parse_digits(sides_str)
        .filter(|size| (1..=MAX_DIE_SIZE).contains(size))
        .ok_or_else(invalid)?;

    if count_str.is_empty() {
        // `d20` is a single die; keep suffixes need an explicit count.
        return match keep {
            Keep::All => Ok(Term::Die { size }),
            Keep::Highest | Keep::Lowest => Err(invalid()),
        };
    }

    let length = parse_digits(count_str)
        .filter(|length| (1..=MAX_DICE).contains(length))
        .ok_or_else(invalid)?;

    if length == 1 && keep == Keep::All {
        Ok(Term::Die { size })
    } else {
        Ok(Term::DieSet { length, size, keep })
    }
}

fn parse_digits(s: &str) -> Option<u32> {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_die_set() {
        let pool = parse("2d20").unwrap();
        assert_eq!(pool.elements().len(), 1);
        match &pool.elements()[0] {
            Element::DieSet(set) => {
                assert_eq!(set.length(), 2);
                assert_eq!(set.size(), 20);
                assert_eq!(set.keep(), Keep::All);
                assert_eq!(set.sign(), Sign::Plus);
            }
            other => panic!("expected die set, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_negative_flat() {
        let pool = parse("-5").unwrap();
        match &pool.elements()[0] {
            Element::Flat(flat) => {
                assert_eq!(flat.sign(), Sign::Minus);
                assert_eq!(flat.value(), -5);
            }
            other => panic!("expected flat, got {other:?}"),
        }
    }

    #[test]
    fn test_single_die_forms() {
        for notation in ["d20", "1d20", " 1d20 "] {
            let pool = parse(notation).unwrap();
            assert!(
                matches!(&pool.elements()[0], Element::Die(die) if die.size() == 20),
                "{notation}"
            );
        }
    }

    #[test]
    fn test_keep_suffixes() {
        let pool = parse("2d20kh + 4d6kl").unwrap();
        let keeps: Vec<Keep> = pool
            .elements()
            .iter()
            .filter_map(|e| match e {
                Element::DieSet(set) => Some(set.keep()),
                _ => None,
            })
            .collect();
        assert_eq!(keeps, vec![Keep::Highest, Keep::Lowest]);

        // An explicit count of one still makes a set when a keep suffix is present.
        let pool = parse("1d20kh").unwrap();
        assert!(matches!(&pool.elements()[0], Element::DieSet(set) if set.length() == 1));
    }

    #[test]
    fn test_whitespace_is_insignificant() {
        let spaced = parse("  2d6 +  1d4 -   3 ").unwrap();
        let tight = parse("2d6+1d4-3").unwrap();
        assert_eq!(spaced, tight);
        assert_eq!(spaced.description(), "2d6+1d4-3");
    }

    #[test]
    fn test_signs_apply_to_dice() {
        let pool = parse("1d20-1d4").unwrap();
        assert_eq!(pool.elements()[1].sign(), Sign::Minus);
        assert_eq!(pool.range().min, 1 - 4);
        assert_eq!(pool.range().max, 20 - 1);
    }

    #[test]
    fn test_invalid_terms_name_the_segment() {
        assert_eq!(
            parse("1d20+abc"),
            Err(ParseError::InvalidTerm {
                segment: "abc".to_string()
            })
        );
        assert_eq!(
            parse("2d0"),
            Err(ParseError::InvalidTerm {
                segment: "2d0".to_string()
            })
        );
        assert_eq!(
            parse("0d6"),
            Err(ParseError::InvalidTerm {
                segment: "0d6".to_string()
            })
        );
        assert!(matches!(parse("d20kh"), Err(ParseError::InvalidTerm { .. })));
        assert!(matches!(parse("2d20kh3"), Err(ParseError::InvalidTerm { .. })));
        assert!(matches!(parse("2 d6"), Err(ParseError::InvalidTerm { .. })));
    }

    #[test]
    fn test_oversized_terms_are_rejected() {
        for segment in ["100000d100000", "4000000000d6", "d3000000000", "2d20000000kh"] {
            assert_eq!(
                parse(segment),
                Err(ParseError::InvalidTerm {
                    segment: segment.to_string()
                }),
                "{segment}"
            );
        }
        assert!(parse(&format!("{MAX_DICE}d{MAX_DIE_SIZE}")).is_ok());
    }

    #[test]
    fn test_expression_bounds_must_fit() {
        assert_eq!(
            parse("2000000000+2000000000"),
            Err(ParseError::InvalidTerm {
                segment: "2000000000".to_string()
            })
        );
        assert_eq!(
            parse("1000d1000000+1000d1000000+1000d1000000"),
            Err(ParseError::InvalidTerm {
                segment: "1000d1000000".to_string()
            })
        );
        assert!(parse("1000d1000000+1000d1000000").is_ok());
    }

    #[test]
    fn test_large_die_rolls_within_range() {
        let mut roller = crate::dice::Roller::seeded(11);
        let mut pool = parse("d1000000-1000d1000000").unwrap();
        for _ in 0..20 {
            let total = pool.roll(&mut roller);
            assert!(pool.range().contains(total), "{total} outside {:?}", pool.range());
        }
    }

    #[test]
    fn test_negative_zero_keeps_its_sign() {
        let pool = parse("5-0").unwrap();
        assert_eq!(pool.elements()[1].sign(), Sign::Minus);
        assert_eq!(pool.description(), "5-0");
        assert_eq!(pool.value(), Some(5));
    }

    #[test]
    fn test_dangling_signs() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("1d20+"), Err(ParseError::MissingTerm { position: 5 }));
        assert_eq!(parse("1d20+-2"), Err(ParseError::MissingTerm { position: 5 }));
        assert_eq!(parse("+"), Err(ParseError::MissingTerm { position: 1 }));
    }

    #[test]
    fn test_leading_plus_is_dropped_from_description() {
        assert_eq!(parse("+1d20+5").unwrap().description(), "1d20+5");
    }

    #[test]
    fn test_parse_with_value_reconstructs() {
        let pool = parse_with("1d20+5", &ParseOptions::new().value(17).target(15)).unwrap();
        assert_eq!(pool.value(), Some(17));
        assert_eq!(pool.summary(), "12+5");
        assert_eq!(pool.diff(), Some(2));
    }

    #[test]
    fn test_parse_with_values_for_die_set() {
        let pool = parse_with("3d6", &ParseOptions::new().values(vec![10])).unwrap();
        match &pool.elements()[0] {
            Element::DieSet(set) => assert_eq!(set.faces(), Some(vec![6, 3, 1])),
            other => panic!("expected die set, got {other:?}"),
        }

        let pool = parse_with(
            "3d6",
            &ParseOptions::new().value(11).spread(Spread::Even),
        )
        .unwrap();
        match &pool.elements()[0] {
            Element::DieSet(set) => assert_eq!(set.faces(), Some(vec![5, 3, 3])),
            other => panic!("expected die set, got {other:?}"),
        }

        // Even spread drops what the first die cannot hold.
        let pool = parse_with(
            "3d6",
            &ParseOptions::new().value(17).spread(Spread::Even),
        )
        .unwrap();
        assert_eq!(pool.value(), Some(16));
    }

    #[test]
    fn test_parse_with_value_for_keep_highest() {
        let pool = parse_with("2d20kh+3", &ParseOptions::new().value(23)).unwrap();
        assert_eq!(pool.value(), Some(23));
        assert_eq!(pool.critical_faces(), vec![20]);
    }

    #[test]
    fn test_parse_without_value_is_unrolled() {
        let pool = parse_with("1d20+5", &ParseOptions::new().target(10)).unwrap();
        assert_eq!(pool.value(), None);
        assert_eq!(pool.target(), Some(10));
        assert_eq!(pool.outcome(), None);
    }
}
