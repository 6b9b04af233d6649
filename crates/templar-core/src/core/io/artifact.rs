use crate::core::models::alignment::{AlignmentError, PairwiseAlignment, SequenceRecord};
use bio::io::fasta;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed FASTA record: {0}")]
    InvalidRecord(String),
    #[error("Invalid alignment: {0}")]
    Alignment(#[from] AlignmentError),
}

/// Writes a pairwise alignment as aligned FASTA, one line per sequence.
pub fn write_alignment(alignment: &PairwiseAlignment, writer: impl Write) -> io::Result<()> {
    let mut writer = fasta::Writer::new(writer);
    for record in [alignment.first(), alignment.second()] {
        writer.write(&record.id, None, record.sequence.as_bytes())?;
    }
    writer.flush()
}

pub fn write_alignment_to_path(alignment: &PairwiseAlignment, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_alignment(alignment, file)
}

/// Reads an aligned FASTA file holding exactly two records.
pub fn read_alignment(reader: impl Read) -> Result<PairwiseAlignment, ArtifactError> {
    let mut records = Vec::new();
    for result in fasta::Reader::new(reader).records() {
        let record = result?;
        record
            .check()
            .map_err(|reason| ArtifactError::InvalidRecord(reason.to_string()))?;
        records.push(SequenceRecord::new(
            record.id(),
            String::from_utf8_lossy(record.seq()).into_owned(),
        ));
    }

    let count = records.len();
    let mut records = records.into_iter();
    match (records.next(), records.next(), records.next()) {
        (Some(first), Some(second), None) => Ok(PairwiseAlignment::new(first, second)?),
        _ => Err(AlignmentError::WrongSequenceCount(count).into()),
    }
}

pub fn read_alignment_from_path(path: &Path) -> Result<PairwiseAlignment, ArtifactError> {
    read_alignment(File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn sample() -> PairwiseAlignment {
        PairwiseAlignment::new(
            SequenceRecord::new("P01112", "ACDEFGHIK--LMN"),
            SequenceRecord::new("5P21A", "--DEFGHIKWWLMN"),
        )
        .unwrap()
    }

    #[test]
    fn written_alignment_reads_back_identically() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("P01112_5P21A.aln");
        write_alignment_to_path(&sample(), &path).unwrap();
        assert_eq!(read_alignment_from_path(&path).unwrap(), sample());
    }

    #[test]
    fn written_alignment_has_one_header_per_record() {
        let mut out = Vec::new();
        write_alignment(&sample(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().filter(|l| l.starts_with('>')).collect::<Vec<_>>(),
            vec![">P01112", ">5P21A"]
        );
    }

    #[test]
    fn wrapped_sequences_are_joined() {
        let input = Cursor::new(">q\nAC-D\nEF\n>s\nACED\n-F\n");
        let alignment = read_alignment(input).unwrap();
        assert_eq!(alignment.first().sequence, "AC-DEF");
        assert_eq!(alignment.second().sequence, "ACED-F");
    }

    #[test]
    fn header_descriptions_are_ignored() {
        let input = Cursor::new(">q some description\nAC-D\n>s\nACED\n");
        let alignment = read_alignment(input).unwrap();
        assert_eq!(alignment.first().id, "q");
        assert_eq!(alignment.first().sequence, "AC-D");
    }

    #[test]
    fn read_rejects_wrong_record_count() {
        let input = Cursor::new(">q\nACD\n");
        assert!(matches!(
            read_alignment(input),
            Err(ArtifactError::Alignment(AlignmentError::WrongSequenceCount(1)))
        ));
    }

    #[test]
    fn read_rejects_sequence_before_header() {
        let input = Cursor::new("ACD\n>q\nACD\n");
        assert!(read_alignment(input).is_err());
    }
}
