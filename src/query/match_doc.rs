//! Ranked hits and their binary form.

use std::io::{Cursor, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::DocId;
use crate::error::{LucerneError, Result};
use crate::query::sort::SortValue;
use crate::util::varint;

/// A single hit: doc ID, score, and the sort values it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDoc {
    /// The document ID.
    pub doc_id: DocId,
    /// The relevance score.
    pub score: f32,
    /// One value per field rule of the active sort spec.
    pub values: Option<Vec<SortValue>>,
}

impl MatchDoc {
    /// Create a hit without sort values.
    pub fn new(doc_id: DocId, score: f32) -> Self {
        MatchDoc {
            doc_id,
            score,
            values: None,
        }
    }

    /// Attach sort values.
    pub fn with_values(mut self, values: Vec<SortValue>) -> Self {
        self.values = Some(values);
        self
    }

    /// Write: varint doc ID, f32 score, u8 values flag, then the values as a
    /// varint count followed by tagged values.
    pub fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        varint::write_u32(writer, self.doc_id)?;
        writer.write_f32::<BigEndian>(self.score)?;
        match &self.values {
            Some(values) => {
                writer.write_u8(1)?;
                varint::write_u32(writer, values.len() as u32)?;
                for value in values {
                    value.serialize(writer)?;
                }
            }
            None => writer.write_u8(0)?,
        }
        Ok(())
    }

    /// Read a hit written by [`MatchDoc::serialize`].
    pub fn deserialize<R: Read>(reader: &mut R) -> Result<Self> {
        let doc_id = varint::read_u32(reader)?;
        let score = reader.read_f32::<BigEndian>()?;
        let values = match reader.read_u8()? {
            0 => None,
            1 => {
                let count = varint::read_u32(reader)?;
                Some(
                    (0..count)
                        .map(|_| SortValue::deserialize(reader))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            flag => {
                return Err(LucerneError::serialization(format!(
                    "Invalid values flag: {flag}"
                )));
            }
        };
        Ok(MatchDoc {
            doc_id,
            score,
            values,
        })
    }
}

/// The best hits of a search, best first, plus the total match count.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TopDocs {
    /// Hits in ranked order.
    pub match_docs: Vec<MatchDoc>,
    /// Number of documents that matched, including those not returned.
    pub total_hits: u32,
}

impl TopDocs {
    /// Create a result set.
    pub fn new(match_docs: Vec<MatchDoc>, total_hits: u32) -> Self {
        TopDocs {
            match_docs,
            total_hits,
        }
    }

    /// Number of hits returned.
    pub fn len(&self) -> usize {
        self.match_docs.len()
    }

    /// Check if no hits were returned.
    pub fn is_empty(&self) -> bool {
        self.match_docs.is_empty()
    }

    /// Doc IDs in ranked order.
    pub fn doc_ids(&self) -> Vec<DocId> {
        self.match_docs.iter().map(|doc| doc.doc_id).collect()
    }

    /// Drop the first `offset` hits, keeping `total_hits`.
    pub fn skip(mut self, offset: usize) -> Self {
        let offset = offset.min(self.match_docs.len());
        self.match_docs.drain(..offset);
        self
    }

    /// Write: varint hit count, each hit, then u32 total hits.
    pub fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        varint::write_u32(writer, self.match_docs.len() as u32)?;
        for match_doc in &self.match_docs {
            match_doc.serialize(writer)?;
        }
        writer.write_u32::<BigEndian>(self.total_hits)?;
        Ok(())
    }

    /// Read results written by [`TopDocs::serialize`].
    pub fn deserialize<R: Read>(reader: &mut R) -> Result<Self> {
        let count = varint::read_u32(reader)?;
        let match_docs = (0..count)
            .map(|_| MatchDoc::deserialize(reader))
            .collect::<Result<Vec<_>>>()?;
        let total_hits = reader.read_u32::<BigEndian>()?;
        Ok(TopDocs {
            match_docs,
            total_hits,
        })
    }

    /// Serialize into a new buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.serialize(&mut buf)?;
        Ok(buf)
    }

    /// Deserialize from a buffer, rejecting trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let top_docs = TopDocs::deserialize(&mut cursor)?;
        if (cursor.position() as usize) != bytes.len() {
            return Err(LucerneError::serialization(format!(
                "{} trailing bytes after TopDocs",
                bytes.len() - cursor.position() as usize
            )));
        }
        Ok(top_docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_doc_layout() {
        let mut buf = Vec::new();
        MatchDoc::new(300, 1.5).serialize(&mut buf).unwrap();

        // 300 as a varint, 1.5f32 big-endian, no values.
        assert_eq!(buf, vec![0xAC, 0x02, 0x3F, 0xC0, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_top_docs_round_trip() {
        let top_docs = TopDocs::new(
            vec![
                MatchDoc::new(7, 2.5).with_values(vec![
                    SortValue::Text("b".to_string()),
                    SortValue::Null,
                ]),
                MatchDoc::new(3, 1.0)
                    .with_values(vec![SortValue::Integer(-4), SortValue::Float(0.25)]),
                MatchDoc::new(12, 0.5),
            ],
            42,
        );

        let bytes = top_docs.to_bytes().unwrap();
        assert_eq!(&bytes[bytes.len() - 4..], &[0, 0, 0, 42]);
        assert_eq!(TopDocs::from_bytes(&bytes).unwrap(), top_docs);
    }

    #[test]
    fn test_truncated_top_docs() {
        let bytes = TopDocs::new(vec![MatchDoc::new(1, 1.0)], 1)
            .to_bytes()
            .unwrap();
        assert!(TopDocs::from_bytes(&bytes[..bytes.len() - 1]).is_err());

        let mut extended = bytes.clone();
        extended.push(0);
        assert!(TopDocs::from_bytes(&extended).is_err());
    }

    #[test]
    fn test_skip() {
        let top_docs = TopDocs::new(
            vec![MatchDoc::new(1, 3.0), MatchDoc::new(2, 2.0), MatchDoc::new(3, 1.0)],
            10,
        );
        let rest = top_docs.clone().skip(2);
        assert_eq!(rest.doc_ids(), vec![3]);
        assert_eq!(rest.total_hits, 10);
        assert!(top_docs.skip(5).is_empty());
    }
}
