use serde::de::value::MapAccessDeserializer;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::de::{IoRead, SliceRead, StreamDeserializer};
use std::collections::VecDeque;
use std::fmt;
use std::io::Read;
use vulntechx_core::TechRecord;

/// One top-level JSON value: a record, an array of records, or `null`.
///
/// Dispatches on the value's shape through `deserialize_any`, so decode
/// errors keep serde_json's line and column.
enum Frame {
    One(TechRecord),
    Many(Vec<TechRecord>),
}

impl<'de> Deserialize<'de> for Frame {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        d.deserialize_any(FrameVisitor)
    }
}

struct FrameVisitor;

impl<'de> Visitor<'de> for FrameVisitor {
    type Value = Frame;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a technology record object or an array of them")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Frame, A::Error> {
        TechRecord::deserialize(MapAccessDeserializer::new(map)).map(Frame::One)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Frame, A::Error> {
        let mut records = Vec::new();
        while let Some(r) = seq.next_element::<TechRecord>()? {
            records.push(r);
        }
        Ok(Frame::Many(records))
    }

    // A bare `null` decodes to a record without tech, which the engine skips.
    fn visit_unit<E: de::Error>(self) -> Result<Frame, E> {
        Ok(Frame::One(TechRecord::default()))
    }
}

/// Lazily decodes concatenated JSON records.
///
/// Values may be separated by any whitespace. A top-level array yields its
/// elements in order. The first malformed value ends the stream with an
/// error; end of input ends it cleanly.
pub struct RecordStream<'de, R: serde_json::de::Read<'de>> {
    frames: StreamDeserializer<'de, R, Frame>,
    pending: VecDeque<TechRecord>,
    failed: bool,
}

impl<'de> RecordStream<'de, SliceRead<'de>> {
    pub fn from_slice(bytes: &'de [u8]) -> Self {
        Self::new(serde_json::Deserializer::from_slice(bytes).into_iter())
    }
}

impl<R: Read> RecordStream<'static, IoRead<R>> {
    pub fn from_reader(reader: R) -> Self {
        Self::new(serde_json::Deserializer::from_reader(reader).into_iter())
    }
}

impl<'de, R: serde_json::de::Read<'de>> RecordStream<'de, R> {
    fn new(frames: StreamDeserializer<'de, R, Frame>) -> Self {
        RecordStream { frames, pending: VecDeque::new(), failed: false }
    }
}

impl<'de, R: serde_json::de::Read<'de>> Iterator for RecordStream<'de, R> {
    type Item = Result<TechRecord, serde_json::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(r) = self.pending.pop_front() {
                return Some(Ok(r));
            }
            if self.failed {
                return None;
            }
            match self.frames.next()? {
                Ok(Frame::One(r)) => return Some(Ok(r)),
                Ok(Frame::Many(rs)) => self.pending.extend(rs),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
