use super::TypeTag;
use crate::common::{Error, Result};
use crate::lane::{Lane, Mask, Vector, Width};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One captured value.
///
/// The payload is always exactly `tag.size()` bytes, whether the snapshot was
/// pushed or deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSnapshot")]
pub struct Snapshot {
    tag: TypeTag,
    payload: Vec<u8>,
    line: u32,
    seq: u32,
    precision_ulp: u32,
}

/// Wire form of a [`Snapshot`] before its payload size is checked.
#[derive(Deserialize)]
struct RawSnapshot {
    tag: TypeTag,
    payload: Vec<u8>,
    line: u32,
    seq: u32,
    precision_ulp: u32,
}

impl TryFrom<RawSnapshot> for Snapshot {
    type Error = Error;

    fn try_from(raw: RawSnapshot) -> Result<Self> {
        if raw.payload.len() != raw.tag.size() {
            return Err(Error::PayloadSize {
                tag: raw.tag,
                expected: raw.tag.size(),
                got: raw.payload.len(),
            });
        }

        Ok(Self {
            tag: raw.tag,
            payload: raw.payload,
            line: raw.line,
            seq: raw.seq,
            precision_ulp: raw.precision_ulp,
        })
    }
}

impl Snapshot {
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Raw native-endian bytes, exactly `tag().size()` long.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn seq(&self) -> u32 {
        self.seq
    }

    /// Tolerance in ULP; always 0 for non-float tags.
    pub fn precision(&self) -> u32 {
        if self.tag.is_float() {
            self.precision_ulp
        } else {
            0
        }
    }
}

/// The ordered results of one named test, captured under one capability set.
///
/// A test case is filled by the single thread running the test and compared
/// once finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    name: String,
    file: String,
    results: Vec<Snapshot>,
    #[serde(skip)]
    seq: u32,
    #[serde(skip)]
    precision_ulp: u32,
}

impl TestCase {
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            results: Vec::new(),
            seq: 0,
            precision_ulp: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source file the test lives in.
    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Tolerance recorded with subsequent captures.
    pub fn set_precision(&mut self, ulp: u32) {
        self.precision_ulp = ulp;
    }

    pub fn precision(&self) -> u32 {
        self.precision_ulp
    }

    /// Restart sequence numbering for subsequent captures.
    pub fn reset_seq(&mut self) {
        self.seq = 0;
    }

    /// Append a snapshot of `payload` declared as `tag`.
    ///
    /// # Panics
    ///
    /// Panics if `payload` is not exactly `tag.size()` bytes.
    pub fn push(&mut self, tag: TypeTag, payload: &[u8], line: u32) {
        assert_eq!(
            payload.len(),
            tag.size(),
            "{tag} snapshot at line {line} of `{}` needs {} bytes",
            self.name,
            tag.size()
        );

        self.results.push(Snapshot {
            tag,
            payload: payload.to_vec(),
            line,
            seq: self.seq,
            precision_ulp: self.precision_ulp,
        });
        self.seq += 1;
    }

    /// Append a snapshot declared by numeric tag code.
    ///
    /// # Panics
    ///
    /// Panics on a code outside the closed tag set, or on a payload size
    /// mismatch.
    pub fn push_code(&mut self, code: u8, payload: &[u8], line: u32) {
        match TypeTag::try_from(code) {
            Ok(tag) => self.push(tag, payload, line),
            Err(err) => panic!("{err} at line {line} of `{}`", self.name),
        }
    }

    /// Capture a vector.
    ///
    /// Vectors wider than a tag are captured as consecutive register-width
    /// snapshots, widest dividing width first, all at `line`.
    pub fn push_vector<T: Lane>(&mut self, vector: &Vector<T>, line: u32) {
        let bytes = vector.as_bytes();
        let Some(width) = Width::widest_dividing(bytes.len()) else {
            unreachable!("vector shapes are whole 16-byte blocks");
        };

        let tag = TypeTag::vector(T::KIND, width);
        for piece in bytes.chunks_exact(width.bytes()) {
            self.push(tag, piece, line);
        }
    }

    /// Capture a mask through its data form.
    pub fn push_mask<T: Lane>(&mut self, mask: &Mask<T>, line: u32) {
        self.push_vector(&mask.to_vector(), line);
    }

    /// Capture a 16-bit packed bitmask.
    pub fn push_bitmask(&mut self, bits: u16, line: u32) {
        self.push(TypeTag::Uint16, &bits.to_ne_bytes(), line);
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).map_err(|e| Error::Yaml(e.to_string()))
    }

    /// Parse a YAML document.
    ///
    /// Fails on any snapshot whose payload does not match its tag.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let mut case: TestCase =
            serde_saphyr::from_str(text).map_err(|e| Error::Yaml(e.to_string()))?;
        case.seq = case.results.last().map_or(0, |last| last.seq + 1);
        Ok(case)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }
}

/// Capture a vector into a test case at the current source line.
///
/// ```
/// use lanekit::{capture, oracle::TestCase, Vector};
///
/// let mut case = TestCase::new("splat", file!());
/// capture!(case, Vector::splat(7u16, 8).unwrap());
/// assert_eq!(case.len(), 1);
/// ```
#[macro_export]
macro_rules! capture {
    ($case:expr, $vector:expr) => {
        $case.push_vector(&$vector, line!())
    };
}

/// Capture a mask into a test case at the current source line.
#[macro_export]
macro_rules! capture_mask {
    ($case:expr, $mask:expr) => {
        $case.push_mask(&$mask, line!())
    };
}
