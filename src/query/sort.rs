//! Sort rules and sort specifications.
//!
//! A [`SortSpec`] is an ordered list of [`SortRule`]s. Hits are compared rule
//! by rule; the first rule that tells two hits apart decides, and hits that
//! tie on every rule fall back to ascending doc ID.

use std::cmp::Ordering;
use std::fmt;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::{LucerneError, Result};
use crate::schema::Schema;
use crate::util::varint;

const RULE_FIELD: u32 = 0;
const RULE_SCORE: u32 = 1;
const RULE_DOC_ID: u32 = 2;

/// A field value used as a sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SortValue {
    /// Missing value; sorts after every present value in either direction.
    Null,
    /// Integer key.
    Integer(i64),
    /// Floating point key.
    Float(f64),
    /// Text key, compared bytewise.
    Text(String),
}

impl SortValue {
    /// Whether this is the missing value.
    pub fn is_null(&self) -> bool {
        matches!(self, SortValue::Null)
    }

    /// Compare two values in ascending order.
    ///
    /// Integers and floats compare numerically with each other; numbers sort
    /// before text and null sorts last.
    pub fn compare(&self, other: &SortValue) -> Ordering {
        use SortValue::*;
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Integer(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Integer(b)) => a.total_cmp(&(*b as f64)),
            (Text(a), Text(b)) => a.cmp(b),
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Greater,
            (_, Null) => Ordering::Less,
            (Text(_), _) => Ordering::Greater,
            (_, Text(_)) => Ordering::Less,
        }
    }

    /// Compare for ranking: present values in ascending order (descending
    /// when `reverse`), with nulls always last.
    pub fn compare_nulls_last(&self, other: &SortValue, reverse: bool) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ord = self.compare(other);
                if reverse { ord.reverse() } else { ord }
            }
        }
    }

    /// Write a tagged value.
    pub fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        use byteorder::{BigEndian, WriteBytesExt};

        match self {
            SortValue::Null => writer.write_u8(0)?,
            SortValue::Integer(i) => {
                writer.write_u8(1)?;
                writer.write_i64::<BigEndian>(*i)?;
            }
            SortValue::Float(f) => {
                writer.write_u8(2)?;
                writer.write_f64::<BigEndian>(*f)?;
            }
            SortValue::Text(s) => {
                writer.write_u8(3)?;
                varint::write_string(writer, s)?;
            }
        }
        Ok(())
    }

    /// Read a value written by [`SortValue::serialize`].
    pub fn deserialize<R: Read>(reader: &mut R) -> Result<Self> {
        use byteorder::{BigEndian, ReadBytesExt};

        match reader.read_u8()? {
            0 => Ok(SortValue::Null),
            1 => Ok(SortValue::Integer(reader.read_i64::<BigEndian>()?)),
            2 => Ok(SortValue::Float(reader.read_f64::<BigEndian>()?)),
            3 => Ok(SortValue::Text(varint::read_string(reader)?)),
            tag => Err(LucerneError::serialization(format!(
                "Unknown sort value tag: {tag}"
            ))),
        }
    }
}

/// What a [`SortRule`] orders by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortRuleKind {
    /// Relevance score, highest first.
    Score,
    /// Doc ID, lowest first.
    DocId,
    /// A sortable field's value, lowest first.
    Field(String),
}

/// One comparison rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRule {
    kind: SortRuleKind,
    reverse: bool,
}

impl SortRule {
    /// Create a rule.
    pub fn new(kind: SortRuleKind, reverse: bool) -> Self {
        SortRule { kind, reverse }
    }

    /// Order by score, highest first.
    pub fn score() -> Self {
        SortRule::new(SortRuleKind::Score, false)
    }

    /// Order by doc ID, lowest first.
    pub fn doc_id() -> Self {
        SortRule::new(SortRuleKind::DocId, false)
    }

    /// Order by a field's value, lowest first.
    pub fn field<S: Into<String>>(name: S) -> Self {
        SortRule::new(SortRuleKind::Field(name.into()), false)
    }

    /// Invert this rule's natural direction.
    pub fn reversed(mut self) -> Self {
        self.reverse = !self.reverse;
        self
    }

    /// What the rule orders by.
    pub fn kind(&self) -> &SortRuleKind {
        &self.kind
    }

    /// The field name, or `None` for score and doc-ID rules.
    pub fn field_name(&self) -> Option<&str> {
        match &self.kind {
            SortRuleKind::Field(name) => Some(name),
            _ => None,
        }
    }

    /// Whether the natural direction is inverted.
    pub fn reverse(&self) -> bool {
        self.reverse
    }

    /// Write the rule: varint type, field name for field rules, varint
    /// reverse flag.
    pub fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        match &self.kind {
            SortRuleKind::Field(name) => {
                varint::write_u32(writer, RULE_FIELD)?;
                varint::write_string(writer, name)?;
            }
            SortRuleKind::Score => {
                varint::write_u32(writer, RULE_SCORE)?;
            }
            SortRuleKind::DocId => {
                varint::write_u32(writer, RULE_DOC_ID)?;
            }
        }
        varint::write_u32(writer, self.reverse as u32)?;
        Ok(())
    }

    /// Read a rule written by [`SortRule::serialize`].
    pub fn deserialize<R: Read>(reader: &mut R) -> Result<Self> {
        let kind = match varint::read_u32(reader)? {
            RULE_FIELD => SortRuleKind::Field(varint::read_string(reader)?),
            RULE_SCORE => SortRuleKind::Score,
            RULE_DOC_ID => SortRuleKind::DocId,
            other => {
                return Err(LucerneError::serialization(format!(
                    "Unknown sort rule type: {other}"
                )));
            }
        };
        let reverse = varint::read_u32(reader)? != 0;
        Ok(SortRule { kind, reverse })
    }
}

impl fmt::Display for SortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortValue::Null => write!(f, "null"),
            SortValue::Integer(value) => write!(f, "{value}"),
            SortValue::Float(value) => write!(f, "{value}"),
            SortValue::Text(value) => write!(f, "{value}"),
        }
    }
}

impl fmt::Display for SortRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SortRuleKind::Score => write!(f, "score")?,
            SortRuleKind::DocId => write!(f, "doc_id")?,
            SortRuleKind::Field(name) => write!(f, "{name}")?,
        }
        if self.reverse {
            write!(f, " (reversed)")?;
        }
        Ok(())
    }
}

/// A non-empty, ordered list of sort rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SortRule>", into = "Vec<SortRule>")]
pub struct SortSpec {
    rules: Vec<SortRule>,
}

impl SortSpec {
    /// Create a sort spec. At least one rule is required.
    pub fn new(rules: Vec<SortRule>) -> Result<Self> {
        if rules.is_empty() {
            return Err(LucerneError::query(
                "Can't supply a SortSpec with no SortRules",
            ));
        }
        Ok(SortSpec { rules })
    }

    /// The default relevance order: score descending, then doc ID.
    pub fn relevance() -> Self {
        SortSpec {
            rules: vec![SortRule::score(), SortRule::doc_id()],
        }
    }

    /// The rules in priority order.
    pub fn rules(&self) -> &[SortRule] {
        &self.rules
    }

    /// Names of the fields sorted on, in rule order.
    pub fn field_names(&self) -> Vec<&str> {
        self.rules.iter().filter_map(|rule| rule.field_name()).collect()
    }

    /// Whether any rule needs the relevance score.
    pub fn needs_score(&self) -> bool {
        self.rules
            .iter()
            .any(|rule| matches!(rule.kind, SortRuleKind::Score))
    }

    /// Check that every field rule names a sortable field of `schema`.
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        for name in self.field_names() {
            if !schema.is_sortable(name) {
                return Err(LucerneError::query(format!(
                    "'{name}' isn't a sortable field"
                )));
            }
        }
        Ok(())
    }

    /// Write a varint rule count followed by each rule.
    pub fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        varint::write_u32(writer, self.rules.len() as u32)?;
        for rule in &self.rules {
            rule.serialize(writer)?;
        }
        Ok(())
    }

    /// Read a spec written by [`SortSpec::serialize`].
    pub fn deserialize<R: Read>(reader: &mut R) -> Result<Self> {
        let num_rules = varint::read_u32(reader)?;
        let rules = (0..num_rules)
            .map(|_| SortRule::deserialize(reader))
            .collect::<Result<Vec<_>>>()?;
        SortSpec::new(rules)
    }
}

impl TryFrom<Vec<SortRule>> for SortSpec {
    type Error = LucerneError;

    fn try_from(rules: Vec<SortRule>) -> Result<Self> {
        SortSpec::new(rules)
    }
}

impl From<SortSpec> for Vec<SortRule> {
    fn from(spec: SortSpec) -> Self {
        spec.rules
    }
}
