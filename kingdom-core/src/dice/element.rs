//! Dice elements: flat modifiers, single dice, die sets and pools.
//!
//! Every element reports a signed `value` (once rolled or assigned), a
//! normalized `range`, and a notation form. Pools are ordered, signed
//! compositions of the other elements and are what the notation parser
//! produces.

use super::distribute::{self, Spread};
use super::rig::Roller;
use crate::outcome::{self, DegreeOfSuccess};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of the die whose natural faces shift degrees of success.
pub const CRITICAL_DIE_SIZE: u32 = 20;

/// Largest number of dice in one set.
pub const MAX_DICE: u32 = 1_000;

/// Largest number of faces on one die.
pub const MAX_DIE_SIZE: u32 = 1_000_000;

/// Sign of a term within a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

impl Sign {
    pub fn factor(self) -> i32 {
        match self {
            Sign::Plus => 1,
            Sign::Minus => -1,
        }
    }

    /// Multiply a magnitude by this sign.
    pub fn apply(self, value: i32) -> i32 {
        value.saturating_mul(self.factor())
    }

    pub fn of(value: i32) -> Sign {
        if value < 0 {
            Sign::Minus
        } else {
            Sign::Plus
        }
    }
}

/// Which dice of a set count toward its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Keep {
    #[default]
    All,
    Highest,
    Lowest,
}

impl Keep {
    /// Notation suffix (`""`, `"kh"` or `"kl"`).
    pub fn suffix(self) -> &'static str {
        match self {
            Keep::All => "",
            Keep::Highest => "kh",
            Keep::Lowest => "kl",
        }
    }
}

/// Inclusive value range, always normalized so that `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: i32,
    pub max: i32,
}

impl Range {
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Range of `count` dice with `size` faces under `sign`.
    ///
    /// Saturates at the `i32` bounds; dice built through [`Die::new`] and
    /// [`DieSet::new`] always stay well inside them.
    pub fn of_dice(sign: Sign, count: u32, size: u32) -> Self {
        let max = i32::try_from(u64::from(count) * u64::from(size)).unwrap_or(i32::MAX);
        let min = i32::try_from(count).unwrap_or(i32::MAX);
        Self::new(sign.apply(min), sign.apply(max))
    }

    /// Sum of two ranges, or `None` if either bound leaves `i32`.
    pub fn checked_add(self, other: Range) -> Option<Range> {
        Some(Range {
            min: self.min.checked_add(other.min)?,
            max: self.max.checked_add(other.max)?,
        })
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }

    /// Distance between the bounds.
    pub fn span(&self) -> i32 {
        self.max.saturating_sub(self.min)
    }
}

impl std::ops::Add for Range {
    type Output = Range;

    fn add(self, other: Range) -> Range {
        Range {
            min: self.min.saturating_add(other.min),
            max: self.max.saturating_add(other.max),
        }
    }
}

/// A fixed modifier: an unsigned magnitude under an explicit sign, so `-0`
/// keeps its minus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flat {
    magnitude: i32,
    sign: Sign,
}

impl Flat {
    /// A flat whose sign is taken from `value`.
    pub fn new(value: i32) -> Self {
        Self {
            magnitude: value.saturating_abs(),
            sign: Sign::of(value),
        }
    }

    pub fn with_sign(mut self, sign: Sign) -> Self {
        self.sign = sign;
        self
    }

    pub fn magnitude(&self) -> i32 {
        self.magnitude
    }

    pub fn value(&self) -> i32 {
        self.sign.apply(self.magnitude)
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn range(&self) -> Range {
        Range::new(self.value(), self.value())
    }
}

/// A single die. The face is always the unsigned natural roll; the sign is
/// applied when reporting `value` and `range`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Die {
    size: u32,
    sign: Sign,
    face: Option<u32>,
}

impl Die {
    /// A die with `size` faces, clamped into `1..=MAX_DIE_SIZE`.
    pub fn new(size: u32) -> Self {
        Self {
            size: size.clamp(1, MAX_DIE_SIZE),
            sign: Sign::Plus,
            face: None,
        }
    }

    pub fn with_sign(mut self, sign: Sign) -> Self {
        self.sign = sign;
        self
    }

    /// Set the natural face, clamped into `1..=size`.
    pub fn with_face(mut self, face: u32) -> Self {
        self.set_face(face);
        self
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    /// The natural (unsigned) face showing, if rolled.
    pub fn face(&self) -> Option<u32> {
        self.face
    }

    pub fn set_face(&mut self, face: u32) {
        self.face = Some(face.clamp(1, self.size));
    }

    pub fn value(&self) -> Option<i32> {
        self.face.map(|face| self.sign.apply(face as i32))
    }

    pub fn range(&self) -> Range {
        Range::of_dice(self.sign, 1, self.size)
    }

    pub fn roll<R: Rng>(&mut self, roller: &mut Roller<R>) -> i32 {
        let face = roller.die_face(self.size);
        self.face = Some(face);
        self.sign.apply(face as i32)
    }

    fn is_critical(&self) -> bool {
        self.size == CRITICAL_DIE_SIZE
    }
}

/// `length` dice of the same size combined under a keep policy.
///
/// With `kh`/`kl` the set behaves as one logical die for range purposes,
/// while still holding every physical die.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieSet {
    size: u32,
    sign: Sign,
    keep: Keep,
    dice: Vec<Die>,
}

impl DieSet {
    /// `length` is clamped into `1..=MAX_DICE` and `size` into
    /// `1..=MAX_DIE_SIZE`.
    pub fn new(length: u32, size: u32, keep: Keep) -> Self {
        let size = size.clamp(1, MAX_DIE_SIZE);
        Self {
            size,
            sign: Sign::Plus,
            keep,
            dice: (0..length.clamp(1, MAX_DICE)).map(|_| Die::new(size)).collect(),
        }
    }

    pub fn with_sign(mut self, sign: Sign) -> Self {
        self.sign = sign;
        self
    }

    /// Set every die's face from `faces`, in order.
    pub fn with_faces(mut self, faces: &[u32]) -> Self {
        self.set_faces(faces);
        self
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn keep(&self) -> Keep {
        self.keep
    }

    /// Physical number of dice.
    pub fn length(&self) -> u32 {
        self.dice.len() as u32
    }

    /// Number of dice that contribute to the range.
    pub fn logical_length(&self) -> u32 {
        match self.keep {
            Keep::All => self.length(),
            Keep::Highest | Keep::Lowest => 1,
        }
    }

    pub fn dice(&self) -> &[Die] {
        &self.dice
    }

    pub fn faces(&self) -> Option<Vec<u32>> {
        self.dice.iter().map(Die::face).collect()
    }

    pub fn set_faces(&mut self, faces: &[u32]) {
        for (die, &face) in self.dice.iter_mut().zip(faces) {
            die.set_face(face);
        }
    }

    /// The unsigned realized value: sum, highest or lowest face.
    pub fn kept(&self) -> Option<u32> {
        let faces = self.faces()?;
        match self.keep {
            Keep::All => Some(faces.iter().sum()),
            Keep::Highest => faces.into_iter().max(),
            Keep::Lowest => faces.into_iter().min(),
        }
    }

    pub fn value(&self) -> Option<i32> {
        self.kept().map(|kept| self.sign.apply(kept as i32))
    }

    pub fn range(&self) -> Range {
        Range::of_dice(self.sign, self.logical_length(), self.size)
    }

    pub fn roll<R: Rng>(&mut self, roller: &mut Roller<R>) -> i32 {
        for die in &mut self.dice {
            die.roll(roller);
        }
        self.value().unwrap_or_default()
    }

    fn assign(&mut self, value: i32, spread: Spread) {
        let magnitude = self.sign.apply(value);
        let length = self.dice.len();
        let faces = match self.keep {
            Keep::All => match spread {
                Spread::FrontLoaded => {
                    distribute::distribute_across_dice(length, self.size, magnitude)
                }
                Spread::Even => distribute::spread_evenly(length, self.size, magnitude),
            },
            Keep::Highest | Keep::Lowest => {
                vec![magnitude.clamp(1, self.size as i32) as u32; length]
            }
        };
        self.set_faces(&faces);
    }
}

/// An ordered, signed composition of elements, optionally compared against a
/// target (DC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Pool {
    elements: Vec<Element>,
    target: Option<i32>,
    /// Aggregate forced by a rigged pool roll; bypasses the elements.
    total: Option<i32>,
}

impl Pool {
    pub fn new(elements: Vec<Element>) -> Self {
        Self {
            elements,
            target: None,
            total: None,
        }
    }

    pub fn with_target(mut self, target: Option<i32>) -> Self {
        self.target = target;
        self
    }

    pub fn push(&mut self, element: impl Into<Element>) {
        self.elements.push(element.into());
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn target(&self) -> Option<i32> {
        self.target
    }

    pub fn set_target(&mut self, target: i32) {
        self.target = Some(target);
    }

    /// Signed sum of the element values, or the rigged total.
    ///
    /// `None` while any element is still unrolled.
    pub fn value(&self) -> Option<i32> {
        if self.total.is_some() {
            return self.total;
        }
        self.elements
            .iter()
            .try_fold(0i32, |acc, element| Some(acc.saturating_add(element.value()?)))
    }

    pub fn range(&self) -> Range {
        self.elements
            .iter()
            .fold(Range::new(0, 0), |acc, element| acc + element.range())
    }

    /// `value - target`, when both are known.
    pub fn diff(&self) -> Option<i32> {
        Some(self.value()?.saturating_sub(self.target?))
    }

    pub fn outcome(&self) -> Option<DegreeOfSuccess> {
        let diff = self.diff()?;
        Some(outcome::classify(diff, &self.critical_faces()))
    }

    pub fn succeeded(&self) -> bool {
        self.outcome().is_some_and(DegreeOfSuccess::succeeded)
    }

    pub fn failed(&self) -> bool {
        self.outcome().is_some_and(DegreeOfSuccess::failed)
    }

    /// Natural faces currently showing on d20 elements anywhere in the pool.
    pub fn critical_faces(&self) -> Vec<u32> {
        let mut faces = Vec::new();
        for element in &self.elements {
            element.collect_critical_faces(&mut faces);
        }
        faces
    }

    /// Roll every element, unless the roller supplies a rigged total.
    pub fn roll<R: Rng>(&mut self, roller: &mut Roller<R>) -> i32 {
        if let Some(total) = roller.pool_total(self.range()) {
            self.clear();
            self.total = Some(total);
            return total;
        }
        self.total = None;
        self.elements
            .iter_mut()
            .fold(0i32, |acc, element| acc.saturating_add(element.roll(roller)))
    }

    /// Assign starting values to elements so the pool totals `value`.
    pub fn assign(&mut self, value: i32, spread: Spread) {
        let values = distribute::distribute_over(&self.elements, value);
        self.assign_each(&values, spread);
    }

    /// Assign one value per element, in order.
    pub fn assign_each(&mut self, values: &[i32], spread: Spread) {
        self.total = None;
        for (element, &value) in self.elements.iter_mut().zip(values) {
            element.assign(value, spread);
        }
    }

    /// Notation form, e.g. `"2d20kh+5"`.
    pub fn description(&self) -> String {
        self.join(Element::describe)
    }

    /// Rolled values in place of notation, e.g. `"17+5"`.
    pub fn summary(&self) -> String {
        if let Some(total) = self.total {
            if self.elements.iter().any(|e| e.value().is_none()) {
                return total.to_string();
            }
        }
        self.join(Element::summarize)
    }

    fn join(&self, text: impl Fn(&Element) -> String) -> String {
        let mut out = String::new();
        for (index, element) in self.elements.iter().enumerate() {
            match element.sign() {
                Sign::Minus => out.push('-'),
                Sign::Plus if index > 0 => out.push('+'),
                Sign::Plus => {}
            }
            out.push_str(&text(element));
        }
        out
    }

    fn clear(&mut self) {
        for element in &mut self.elements {
            element.clear();
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Any term of a dice pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Element {
    Flat(Flat),
    Die(Die),
    DieSet(DieSet),
    Pool(Pool),
}

impl Element {
    pub fn sign(&self) -> Sign {
        match self {
            Element::Flat(flat) => flat.sign(),
            Element::Die(die) => die.sign(),
            Element::DieSet(set) => set.sign(),
            Element::Pool(_) => Sign::Plus,
        }
    }

    pub fn value(&self) -> Option<i32> {
        match self {
            Element::Flat(flat) => Some(flat.value()),
            Element::Die(die) => die.value(),
            Element::DieSet(set) => set.value(),
            Element::Pool(pool) => pool.value(),
        }
    }

    pub fn range(&self) -> Range {
        match self {
            Element::Flat(flat) => flat.range(),
            Element::Die(die) => die.range(),
            Element::DieSet(set) => set.range(),
            Element::Pool(pool) => pool.range(),
        }
    }

    pub fn roll<R: Rng>(&mut self, roller: &mut Roller<R>) -> i32 {
        match self {
            Element::Flat(flat) => flat.value(),
            Element::Die(die) => die.roll(roller),
            Element::DieSet(set) => set.roll(roller),
            Element::Pool(pool) => pool.roll(roller),
        }
    }

    /// Degree of success of this element alone against `target`.
    pub fn outcome_against(&self, target: i32) -> Option<DegreeOfSuccess> {
        let mut faces = Vec::new();
        self.collect_critical_faces(&mut faces);
        Some(outcome::classify(self.value()?.saturating_sub(target), &faces))
    }

    /// Unsigned notation text; the pool supplies the sign.
    pub fn describe(&self) -> String {
        match self {
            Element::Flat(flat) => flat.magnitude().to_string(),
            Element::Die(die) => format!("1d{}", die.size()),
            Element::DieSet(set) => {
                format!("{}d{}{}", set.length(), set.size(), set.keep().suffix())
            }
            Element::Pool(pool) => format!("({})", pool.description()),
        }
    }

    /// Unsigned rolled value, falling back to notation while unrolled.
    pub fn summarize(&self) -> String {
        match (self, self.value()) {
            (Element::Pool(pool), Some(_)) => format!("({})", pool.summary()),
            (_, Some(value)) => value.unsigned_abs().to_string(),
            (_, None) => self.describe(),
        }
    }

    pub(crate) fn assign(&mut self, value: i32, spread: Spread) {
        match self {
            Element::Flat(_) => {}
            Element::Die(die) => die.set_face(die.sign().apply(value).max(1) as u32),
            Element::DieSet(set) => set.assign(value, spread),
            Element::Pool(pool) => pool.assign(value, spread),
        }
    }

    fn clear(&mut self) {
        match self {
            Element::Flat(_) => {}
            Element::Die(die) => die.face = None,
            Element::DieSet(set) => set.dice.iter_mut().for_each(|die| die.face = None),
            Element::Pool(pool) => {
                pool.total = None;
                pool.clear();
            }
        }
    }

    fn collect_critical_faces(&self, faces: &mut Vec<u32>) {
        match self {
            Element::Flat(_) => {}
            Element::Die(die) => {
                if die.is_critical() {
                    faces.extend(die.face());
                }
            }
            Element::DieSet(set) => {
                if set.size() != CRITICAL_DIE_SIZE {
                    return;
                }
                match set.keep() {
                    Keep::All => faces.extend(set.dice().iter().filter_map(Die::face)),
                    Keep::Highest | Keep::Lowest => faces.extend(set.kept()),
                }
            }
            Element::Pool(pool) => {
                if pool.total.is_none() {
                    for element in &pool.elements {
                        element.collect_critical_faces(faces);
                    }
                }
            }
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign() == Sign::Minus {
            write!(f, "-")?;
        }
        write!(f, "{}", self.describe())
    }
}

impl From<Flat> for Element {
    fn from(flat: Flat) -> Self {
        Element::Flat(flat)
    }
}

impl From<Die> for Element {
    fn from(die: Die) -> Self {
        Element::Die(die)
    }
}

impl From<DieSet> for Element {
    fn from(set: DieSet) -> Self {
        Element::DieSet(set)
    }
}

impl From<Pool> for Element {
    fn from(pool: Pool) -> Self {
        Element::Pool(pool)
    }
}
