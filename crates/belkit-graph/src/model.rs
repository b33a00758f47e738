use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─────────────────────────────────────────────
// Relation
// ─────────────────────────────────────────────

/// The closed BEL relation vocabulary.
///
/// Relations fall into three disjoint classes the analysis code depends on:
/// causal-increase, causal-decrease, and correlative. Everything else is a
/// structural or weakly-typed relation and is ignored by the scoring rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Relation {
    #[serde(rename = "increases")]
    Increases,
    #[serde(rename = "directlyIncreases")]
    DirectlyIncreases,
    #[serde(rename = "decreases")]
    Decreases,
    #[serde(rename = "directlyDecreases")]
    DirectlyDecreases,
    #[serde(rename = "positiveCorrelation")]
    PositiveCorrelation,
    #[serde(rename = "negativeCorrelation")]
    NegativeCorrelation,
    #[serde(rename = "causesNoChange")]
    CausesNoChange,
    #[serde(rename = "association")]
    Association,
    #[serde(rename = "hasComponent")]
    HasComponent,
    #[serde(rename = "hasVariant")]
    HasVariant,
    #[serde(rename = "hasMember")]
    HasMember,
    #[serde(rename = "isA")]
    IsA,
    #[serde(rename = "partOf")]
    PartOf,
    #[serde(rename = "transcribedTo")]
    TranscribedTo,
    #[serde(rename = "translatedTo")]
    TranslatedTo,
}

impl Relation {
    /// True for `increases` and `directlyIncreases`.
    #[inline]
    pub fn is_causal_increase(self) -> bool {
        matches!(self, Self::Increases | Self::DirectlyIncreases)
    }

    /// True for `decreases` and `directlyDecreases`.
    #[inline]
    pub fn is_causal_decrease(self) -> bool {
        matches!(self, Self::Decreases | Self::DirectlyDecreases)
    }

    /// True for any signed causal relation.
    #[inline]
    pub fn is_causal(self) -> bool {
        self.is_causal_increase() || self.is_causal_decrease()
    }

    /// True for `positiveCorrelation` and `negativeCorrelation`.
    #[inline]
    pub fn is_correlative(self) -> bool {
        matches!(self, Self::PositiveCorrelation | Self::NegativeCorrelation)
    }

    /// The BEL keyword for this relation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Increases => "increases",
            Self::DirectlyIncreases => "directlyIncreases",
            Self::Decreases => "decreases",
            Self::DirectlyDecreases => "directlyDecreases",
            Self::PositiveCorrelation => "positiveCorrelation",
            Self::NegativeCorrelation => "negativeCorrelation",
            Self::CausesNoChange => "causesNoChange",
            Self::Association => "association",
            Self::HasComponent => "hasComponent",
            Self::HasVariant => "hasVariant",
            Self::HasMember => "hasMember",
            Self::IsA => "isA",
            Self::PartOf => "partOf",
            Self::TranscribedTo => "transcribedTo",
            Self::TranslatedTo => "translatedTo",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────
// Reference / Variant
// ─────────────────────────────────────────────

/// A namespaced identifier, e.g. `HGNC:AKT1` or `GO:0006915`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub namespace: String,
    pub name: String,
}

impl Reference {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), name: name.into() }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// A structural modification on a central-dogma entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Post-translational modification, e.g. `pmod(Ph, Ser, 473)`.
    ProteinModification {
        name: String,
        residue: Option<String>,
        position: Option<u32>,
    },
    /// Sequence variant in HGVS notation.
    Hgvs(String),
    /// A proteolytic fragment delimited by residue positions.
    Fragment { start: Option<u32>, stop: Option<u32> },
    /// Truncation at a residue position.
    Truncation { position: u32 },
    /// Fusion with a partner entity.
    Fusion { partner: Reference },
}

// ─────────────────────────────────────────────
// BelNode
// ─────────────────────────────────────────────

/// A typed biological entity — one variant per BEL function.
///
/// Nodes are immutable-identity value objects: equality and hashing are
/// structural, and the canonical `Ord` makes set-valued analysis results
/// deterministic. Computed per-node values (measurements, scores) live in
/// the graph, not on the node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BelNode {
    Gene { reference: Reference, variants: Vec<Variant> },
    Rna { reference: Reference, variants: Vec<Variant> },
    MicroRna { reference: Reference },
    Protein { reference: Reference, variants: Vec<Variant> },
    Abundance { reference: Reference },
    BiologicalProcess { reference: Reference },
    Pathology { reference: Reference },
    Complex { members: Vec<BelNode> },
    Composite { members: Vec<BelNode> },
    Reaction { reactants: Vec<BelNode>, products: Vec<BelNode> },
}

impl BelNode {
    pub fn gene(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Gene { reference: Reference::new(namespace, name), variants: Vec::new() }
    }

    pub fn rna(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Rna { reference: Reference::new(namespace, name), variants: Vec::new() }
    }

    pub fn mirna(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::MicroRna { reference: Reference::new(namespace, name) }
    }

    pub fn protein(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Protein { reference: Reference::new(namespace, name), variants: Vec::new() }
    }

    pub fn abundance(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Abundance { reference: Reference::new(namespace, name) }
    }

    pub fn bioprocess(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::BiologicalProcess { reference: Reference::new(namespace, name) }
    }

    pub fn pathology(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Pathology { reference: Reference::new(namespace, name) }
    }

    pub fn complex(members: Vec<BelNode>) -> Self {
        Self::Complex { members }
    }

    pub fn composite(members: Vec<BelNode>) -> Self {
        Self::Composite { members }
    }

    /// The BEL function keyword for this node.
    pub fn function(&self) -> &'static str {
        match self {
            Self::Gene { .. } => "g",
            Self::Rna { .. } => "r",
            Self::MicroRna { .. } => "m",
            Self::Protein { .. } => "p",
            Self::Abundance { .. } => "a",
            Self::BiologicalProcess { .. } => "bp",
            Self::Pathology { .. } => "path",
            Self::Complex { .. } => "complex",
            Self::Composite { .. } => "composite",
            Self::Reaction { .. } => "rxn",
        }
    }

    /// The namespaced identifier, for variants that carry one.
    pub fn reference(&self) -> Option<&Reference> {
        match self {
            Self::Gene { reference, .. }
            | Self::Rna { reference, .. }
            | Self::MicroRna { reference }
            | Self::Protein { reference, .. }
            | Self::Abundance { reference }
            | Self::BiologicalProcess { reference }
            | Self::Pathology { reference } => Some(reference),
            _ => None,
        }
    }

    /// Structural modifications, empty for functions that cannot carry any.
    pub fn variants(&self) -> &[Variant] {
        match self {
            Self::Gene { variants, .. }
            | Self::Rna { variants, .. }
            | Self::Protein { variants, .. } => variants,
            _ => &[],
        }
    }

    /// The protein this variant-free gene, RNA, or miRNA node codes for.
    ///
    /// Returns `None` for proteins themselves, for nodes with variants
    /// (a modified gene is not interchangeable with its product), and for
    /// non-central-dogma functions.
    pub fn central_dogma_protein(&self) -> Option<BelNode> {
        match self {
            Self::Gene { reference, variants } | Self::Rna { reference, variants }
                if variants.is_empty() =>
            {
                Some(Self::Protein { reference: reference.clone(), variants: Vec::new() })
            }
            Self::MicroRna { reference } => {
                Some(Self::Protein { reference: reference.clone(), variants: Vec::new() })
            }
            _ => None,
        }
    }
}

impl fmt::Display for BelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complex { members } | Self::Composite { members } => {
                write!(f, "{}(", self.function())?;
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{m}")?;
                }
                write!(f, ")")
            }
            Self::Reaction { reactants, products } => {
                write!(f, "rxn(reactants(")?;
                for (i, m) in reactants.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{m}")?;
                }
                write!(f, "), products(")?;
                for (i, m) in products.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{m}")?;
                }
                write!(f, "))")
            }
            _ => match self.reference() {
                Some(r) => write!(f, "{}({r})", self.function()),
                None => write!(f, "{}()", self.function()),
            },
        }
    }
}

// ─────────────────────────────────────────────
// Citation / BelEdge
// ─────────────────────────────────────────────

/// A literature reference backing an edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Citation {
    /// Source database, e.g. `PubMed`.
    pub db: String,
    /// Identifier within the database.
    pub reference: String,
}

impl Citation {
    pub fn pubmed(reference: impl Into<String>) -> Self {
        Self { db: "PubMed".to_string(), reference: reference.into() }
    }
}

/// A directed, keyed multi-edge between two nodes.
///
/// Multiple edges may connect the same ordered node pair with different
/// relations; a structural contradiction is representable, not forbidden.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BelEdge {
    /// Unique edge key (UUIDv4).
    pub id: Uuid,

    /// Source node.
    pub from: Uuid,

    /// Target node.
    pub to: Uuid,

    /// Relation drawn from the closed vocabulary.
    pub relation: Relation,

    /// Literature reference, if curated.
    pub citation: Option<Citation>,

    /// Supporting evidence text.
    pub evidence: Option<String>,

    /// Free-form annotation key/value pairs (cell line, species, ...).
    pub annotations: BTreeMap<String, String>,
}

impl BelEdge {
    pub fn new(from: Uuid, to: Uuid, relation: Relation) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            relation,
            citation: None,
            evidence: None,
            annotations: BTreeMap::new(),
        }
    }

    pub fn with_citation(mut self, citation: Citation) -> Self {
        self.citation = Some(citation);
        self
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
