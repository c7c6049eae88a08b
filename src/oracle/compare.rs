use super::ulp::lanes_within;
use super::{Snapshot, TestCase, TypeTag};
use crate::common::fmt::{binary_bits, decimal_lanes, hex_lanes};
use crate::lane::ElementKind;
use std::fmt::{self, Write};

const SEPARATOR: &str = "--------------------------------------------------------------";

/// A difference that makes two test cases incomparable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralMismatch {
    Name { a: String, b: String },
    Count { a: usize, b: usize },
    Line { index: usize, a: u32, b: u32 },
    Type { index: usize, line: u32, a: TypeTag, b: TypeTag },
}

/// A snapshot pair that disagrees beyond its tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueMismatch {
    pub index: usize,
    pub line: u32,
    pub seq: u32,
    /// Tolerance the pair was compared under.
    pub precision: u32,
}

/// Outcome of comparing two test cases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// First structural mismatch; when set no values were compared.
    pub structural: Option<StructuralMismatch>,
    pub mismatches: Vec<ValueMismatch>,
    /// Number of snapshot pairs whose values were compared.
    pub compared: usize,
}

impl Report {
    pub fn passed(&self) -> bool {
        self.structural.is_none() && self.mismatches.is_empty()
    }
}

/// Compare two finished test cases without rendering anything.
pub fn compare_report(a: &TestCase, b: &TestCase) -> Report {
    if let Some(mismatch) = structural_mismatch(a, b) {
        return Report {
            structural: Some(mismatch),
            ..Report::default()
        };
    }

    let mismatches = a
        .snapshots()
        .iter()
        .zip(b.snapshots())
        .enumerate()
        .filter_map(|(index, (sa, sb))| {
            let precision = sa.precision().max(sb.precision());
            (!values_equal(sa.tag(), sa.payload(), sb.payload(), precision)).then_some(
                ValueMismatch {
                    index,
                    line: sa.line(),
                    seq: sa.seq(),
                    precision,
                },
            )
        })
        .collect();

    Report {
        structural: None,
        mismatches,
        compared: a.len(),
    }
}

/// Compare two test cases captured under `arch_a` and `arch_b`.
///
/// Every value mismatch, or the first structural mismatch, is written to
/// `sink` as a diagnostic block. Returns whether the cases agree.
pub fn compare<W: Write + ?Sized>(
    a: &TestCase,
    arch_a: &str,
    b: &TestCase,
    arch_b: &str,
    sink: &mut W,
) -> bool {
    let report = compare_report(a, b);

    let diagnostics = Diagnostics {
        a,
        arch_a,
        b,
        arch_b,
    };
    if let Err(err) = diagnostics.render(&report, sink) {
        log::warn!("Failed to write diagnostics for test case `{}`: {err}", a.name());
    }

    if !report.passed() {
        log::debug!(
            "Test case `{}` differs between [{arch_a}] and [{arch_b}]: {} of {} snapshots",
            a.name(),
            report.mismatches.len(),
            report.compared
        );
    }
    report.passed()
}

fn structural_mismatch(a: &TestCase, b: &TestCase) -> Option<StructuralMismatch> {
    if a.name() != b.name() {
        return Some(StructuralMismatch::Name {
            a: a.name().to_owned(),
            b: b.name().to_owned(),
        });
    }
    if a.len() != b.len() {
        return Some(StructuralMismatch::Count {
            a: a.len(),
            b: b.len(),
        });
    }

    for (index, (sa, sb)) in a.snapshots().iter().zip(b.snapshots()).enumerate() {
        if sa.line() != sb.line() {
            return Some(StructuralMismatch::Line {
                index,
                a: sa.line(),
                b: sb.line(),
            });
        }
        if sa.tag() != sb.tag() {
            return Some(StructuralMismatch::Type {
                index,
                line: sa.line(),
                a: sa.tag(),
                b: sb.tag(),
            });
        }
    }
    None
}

fn values_equal(tag: TypeTag, a: &[u8], b: &[u8], precision: u32) -> bool {
    if a == b {
        return true;
    }
    if precision == 0 || !tag.is_float() {
        return false;
    }
    match tag.element() {
        ElementKind::F32 => lanes_within::<f32>(a, b, precision),
        ElementKind::F64 => lanes_within::<f64>(a, b, precision),
        _ => false,
    }
}

struct Diagnostics<'a> {
    a: &'a TestCase,
    arch_a: &'a str,
    b: &'a TestCase,
    arch_b: &'a str,
}

impl Diagnostics<'_> {
    fn render<W: Write + ?Sized>(&self, report: &Report, sink: &mut W) -> fmt::Result {
        if let Some(mismatch) = &report.structural {
            return self.structural(mismatch, sink);
        }
        for mismatch in &report.mismatches {
            self.value(mismatch, sink)?;
        }
        Ok(())
    }

    fn structural<W: Write + ?Sized>(&self, mismatch: &StructuralMismatch, sink: &mut W) -> fmt::Result {
        writeln!(sink, "{SEPARATOR}")?;
        match mismatch {
            StructuralMismatch::Name { a, b } => {
                self.file(sink)?;
                writeln!(sink, "FATAL: Test case names do not match: \"{a}\" and \"{b}\"")?;
            }
            StructuralMismatch::Count { a, b } => {
                self.file(sink)?;
                self.test_case(sink)?;
                writeln!(sink, "FATAL: The lengths of the result vectors do not match: {a}/{b}")?;
            }
            StructuralMismatch::Line { index, a, b } => {
                self.file(sink)?;
                self.test_case(sink)?;
                writeln!(
                    sink,
                    "FATAL: Line numbers do not match for items with the same sequence number: \
                     id: {index} line_A: {a} line_B: {b}"
                )?;
            }
            StructuralMismatch::Type { index, line, a, b } => {
                self.file_line(*line, sink)?;
                self.test_case(sink)?;
                writeln!(
                    sink,
                    "FATAL: Types do not match for items with the same sequence number: \
                     id: {index} type_A: {a} type_B: {b}"
                )?;
            }
        }
        writeln!(sink, "{SEPARATOR}")
    }

    fn value<W: Write + ?Sized>(&self, mismatch: &ValueMismatch, sink: &mut W) -> fmt::Result {
        let sa = &self.a.snapshots()[mismatch.index];
        let sb = &self.b.snapshots()[mismatch.index];

        writeln!(sink, "{SEPARATOR}")?;
        self.file_line(mismatch.line, sink)?;
        self.test_case(sink)?;
        writeln!(sink, "  Sequence number: {}", mismatch.seq)?;
        writeln!(sink, "ERROR: Vectors not equal: ")?;
        dump_hex("A", sa, sink)?;
        dump_hex("B", sb, sink)?;
        dump_values("A", sa, sink)?;
        dump_values("B", sb, sink)?;
        if mismatch.precision > 0 {
            writeln!(sink, "  Precision: {}ULP", mismatch.precision)?;
        }
        writeln!(sink, "{SEPARATOR}")
    }

    fn arch<W: Write + ?Sized>(&self, sink: &mut W) -> fmt::Result {
        writeln!(sink, "  For architectures: {} and {} :", self.arch_a, self.arch_b)
    }

    fn file<W: Write + ?Sized>(&self, sink: &mut W) -> fmt::Result {
        self.arch(sink)?;
        writeln!(sink, "  In file \"{}\" :", self.a.file())
    }

    fn file_line<W: Write + ?Sized>(&self, line: u32, sink: &mut W) -> fmt::Result {
        self.arch(sink)?;
        writeln!(sink, "  In file \"{}\" at line {line} : ", self.a.file())
    }

    fn test_case<W: Write + ?Sized>(&self, sink: &mut W) -> fmt::Result {
        writeln!(sink, "  In test case \"{}\" :", self.a.name())
    }
}

fn dump_hex<W: Write + ?Sized>(side: &str, snapshot: &Snapshot, sink: &mut W) -> fmt::Result {
    let tag = snapshot.tag();
    writeln!(sink, "{side} : [ {} ]", hex_lanes(snapshot.payload(), tag.element().size()))
}

fn dump_values<W: Write + ?Sized>(side: &str, snapshot: &Snapshot, sink: &mut W) -> fmt::Result {
    let tag = snapshot.tag();
    let text = match snapshot.payload().first_chunk::<2>() {
        Some(&word) if tag.is_bitmask() => binary_bits(u64::from(u16::from_ne_bytes(word)), 16),
        _ => decimal_lanes(snapshot.payload(), tag.element()),
    };
    writeln!(sink, "{side} : [ {text} ]")
}
