use thiserror::Error;

pub const GAP: u8 = b'-';

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum AlignmentError {
    #[error("Aligned sequences differ in length: '{id_a}' has {len_a} columns, '{id_b}' has {len_b}")]
    LengthMismatch {
        id_a: String,
        len_a: usize,
        id_b: String,
        len_b: usize,
    },
    #[error("Aligned sequence '{0}' contains no residues")]
    NoResidues(String),
    #[error("Alignment does not contain a sequence with id '{0}'")]
    UnknownSequence(String),
    #[error("Expected exactly two aligned sequences, found {0}")]
    WrongSequenceCount(usize),
    #[error("Sequence aligner failed: {0}")]
    Aligner(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub sequence: String,
}

impl SequenceRecord {
    pub fn new(id: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Number of non-gap symbols.
    pub fn residue_count(&self) -> usize {
        self.sequence.bytes().filter(|&b| b != GAP).count()
    }

    /// The sequence with every gap symbol removed.
    pub fn ungapped(&self) -> SequenceRecord {
        SequenceRecord {
            id: self.id.clone(),
            sequence: self.sequence.chars().filter(|&c| c != GAP as char).collect(),
        }
    }
}

/// Two aligned sequences of equal column count.
///
/// The first record is always derived from the query, the second from the structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairwiseAlignment {
    first: SequenceRecord,
    second: SequenceRecord,
}

impl PairwiseAlignment {
    pub fn new(first: SequenceRecord, second: SequenceRecord) -> Result<Self, AlignmentError> {
        let (len_a, len_b) = (first.len(), second.len());
        if len_a != len_b {
            return Err(AlignmentError::LengthMismatch {
                id_a: first.id,
                len_a,
                id_b: second.id,
                len_b,
            });
        }
        for record in [&first, &second] {
            if record.residue_count() == 0 {
                return Err(AlignmentError::NoResidues(record.id.clone()));
            }
        }
        Ok(Self { first, second })
    }

    pub fn first(&self) -> &SequenceRecord {
        &self.first
    }

    pub fn second(&self) -> &SequenceRecord {
        &self.second
    }

    pub fn columns(&self) -> usize {
        self.first.len()
    }

    /// The same alignment with its two records exchanged.
    pub fn swapped(&self) -> Self {
        Self {
            first: self.second.clone(),
            second: self.first.clone(),
        }
    }

    /// Splits the alignment into (query side, structure side) given the structure id.
    pub fn pick(&self, structure_id: &str) -> Result<(&SequenceRecord, &SequenceRecord), AlignmentError> {
        if self.second.id == structure_id {
            Ok((&self.first, &self.second))
        } else if self.first.id == structure_id {
            Ok((&self.second, &self.first))
        } else {
            Err(AlignmentError::UnknownSequence(structure_id.to_string()))
        }
    }

    /// File name under which the alignment is archived.
    pub fn artifact_name(&self) -> String {
        format!("{}_{}.aln", self.first.id, self.second.id)
    }
}
