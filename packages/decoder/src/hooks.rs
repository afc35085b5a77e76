//! Extraction hook protocol
//!
//! The generic flatten step only handles subtrees whose field names never
//! overlap. Schemas whose wire shape breaks that — repeated lists,
//! interchangeable wrapper elements, sub-aggregates that must stay whole —
//! override the pre-flatten hook to pull those substructures out of the
//! working tree first, returning them as side data. After the record is
//! constructed from the flattened attributes, the post-flatten hook
//! assigns the side attributes and recursively decodes the side
//! subaggregates onto the record. The default hook extracts nothing and
//! attaches generically.

use crate::error::Result;
use crate::node::RawNode;
use crate::record::Record;
use crate::registry::DecodeContext;

/// Side data produced by pre-flatten hooks.
///
/// Attributes are raw text values that have no ordinary leaf on the wire;
/// they are validated through the schema's field descriptors when
/// assigned. Subaggregates are whole subtrees to be decoded through the
/// full pipeline and attached as nested records.
#[derive(Debug, Default)]
pub struct Extracted {
    attributes: Vec<(String, String)>,
    subaggregates: Vec<(String, SubAggregate)>,
}

/// A subtree extracted for separate decoding.
#[derive(Debug)]
pub enum SubAggregate {
    /// One nested aggregate
    Single(RawNode),
    /// Repeated aggregates to become an ordered list
    List(Vec<RawNode>),
}

impl Extracted {
    /// Empty side data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a synthesized attribute.
    pub fn attribute(&mut self, field: impl Into<String>, raw: impl Into<String>) {
        self.attributes.push((field.into(), raw.into()));
    }

    /// Record an extracted subaggregate under a slot name.
    pub fn subaggregate(&mut self, slot: impl Into<String>, sub: SubAggregate) {
        self.subaggregates.push((slot.into(), sub));
    }

    /// Whether any side data was extracted.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.subaggregates.is_empty()
    }

    /// Fold another hook's side data into this one.
    pub fn merge(&mut self, other: Extracted) {
        debug_assert!(
            !other
                .attributes
                .iter()
                .any(|(k, _)| self.attributes.iter().any(|(mine, _)| mine == k)),
            "hooks produced the same side attribute twice"
        );
        self.attributes.extend(other.attributes);
        self.subaggregates.extend(other.subaggregates);
    }

    pub(crate) fn into_parts(self) -> (Vec<(String, String)>, Vec<(String, SubAggregate)>) {
        (self.attributes, self.subaggregates)
    }
}

/// Per-schema pre/post processing around the generic flatten step.
///
/// Implementations are registered on schema definitions and invoked
/// polymorphically by the dispatcher; hooks declared by ancestors run
/// too, base-first, with their side data merged.
pub trait ExtractionHooks: Send + Sync {
    /// Inspect the node before flattening, removing any substructure the
    /// flatten step must not see. Default: extract nothing.
    fn pre_flatten(&self, _node: &mut RawNode) -> Result<Extracted> {
        Ok(Extracted::new())
    }

    /// Attach side data to the constructed record. The default assigns
    /// side attributes through the schema's field descriptors and decodes
    /// side subaggregates through the full pipeline.
    fn post_flatten(
        &self,
        ctx: &DecodeContext<'_>,
        record: &mut Record,
        extracted: Extracted,
    ) -> Result<()> {
        ctx.attach(record, extracted)
    }
}

/// No-op hook used by schemas without structural irregularities.
pub struct DefaultHooks;

impl ExtractionHooks for DefaultHooks {}

pub(crate) static DEFAULT_HOOKS: DefaultHooks = DefaultHooks;

/// Records which of the two interchangeable currency wrappers declared
/// the currency fields.
///
/// After flattening, `CURSYM`/`CURRATE` read the same whether they came
/// from `<CURRENCY>` or `<ORIGCURRENCY>`, yet the distinction decides how
/// a foreign-currency transaction is interpreted. The wrapper's own tag
/// is preserved as a synthetic `curtype` attribute. The wrapper sits one
/// level down on simple transactions and two levels down on investment
/// transactions that nest their common part.
pub(crate) struct CurrencySourceHooks;

impl ExtractionHooks for CurrencySourceHooks {
    fn pre_flatten(&self, node: &mut RawNode) -> Result<Extracted> {
        let mut extracted = Extracted::new();
        if let Some(tag) = currency_wrapper(node) {
            extracted.attribute("curtype", tag);
        }
        Ok(extracted)
    }
}

pub(crate) static CURRENCY_SOURCE: CurrencySourceHooks = CurrencySourceHooks;

fn currency_wrapper(node: &RawNode) -> Option<String> {
    let is_wrapper = |n: &RawNode| matches!(n.tag(), "CURRENCY" | "ORIGCURRENCY");

    if let Some(child) = node.children().iter().find(|c| is_wrapper(c)) {
        return Some(child.tag().to_string());
    }
    node.children()
        .iter()
        .flat_map(|c| c.children().iter())
        .find(|gc| is_wrapper(gc))
        .map(|gc| gc.tag().to_string())
}

/// Splits a bank transaction's destination references off as nested
/// records: `CCACCTTO`, `BANKACCTTO`, and `PAYEE` each keep their own
/// shape instead of being flattened into the transaction.
pub(crate) struct TransactionDestinationHooks;

impl ExtractionHooks for TransactionDestinationHooks {
    fn pre_flatten(&self, node: &mut RawNode) -> Result<Extracted> {
        let mut extracted = Extracted::new();
        for tag in ["CCACCTTO", "BANKACCTTO", "PAYEE"] {
            if let Some(child) = node.remove_child(tag) {
                extracted.subaggregate(tag.to_ascii_lowercase(), SubAggregate::Single(child));
            }
        }
        Ok(extracted)
    }
}

pub(crate) static TRANSACTION_DESTINATION: TransactionDestinationHooks =
    TransactionDestinationHooks;

/// Strips a mutual fund's repeated asset-class allocations.
///
/// `MFASSETCLASS`/`FIMFASSETCLASS` hold one `PORTION`/`FIPORTION` per
/// allocation; repeated tags cannot survive flattening, so each container
/// becomes an ordered list of nested records.
pub(crate) struct AssetAllocationHooks;

impl ExtractionHooks for AssetAllocationHooks {
    fn pre_flatten(&self, node: &mut RawNode) -> Result<Extracted> {
        let mut extracted = Extracted::new();
        for (tag, slot) in [
            ("MFASSETCLASS", "mfassetclass"),
            ("FIMFASSETCLASS", "fimfassetclass"),
        ] {
            if let Some(container) = node.remove_child(tag) {
                extracted.subaggregate(slot, SubAggregate::List(container.into_children()));
            }
        }
        Ok(extracted)
    }
}

pub(crate) static ASSET_ALLOCATION: AssetAllocationHooks = AssetAllocationHooks;

/// Discards the security identifier of an option's underlying.
///
/// A direct `SECID` child names the underlying instrument, which the
/// security list does not necessarily describe; only its id/id-type are
/// known, too little to build a record for it. The option's own
/// identifier lives inside its security-info subtree and flattens
/// normally.
pub(crate) struct UnderlyingSecurityHooks;

impl ExtractionHooks for UnderlyingSecurityHooks {
    fn pre_flatten(&self, node: &mut RawNode) -> Result<Extracted> {
        if node.remove_child("SECID").is_some() {
            tracing::debug!(tag = node.tag(), "Discarding underlying security identifier");
        }
        Ok(Extracted::new())
    }
}

pub(crate) static UNDERLYING_SECURITY: UnderlyingSecurityHooks = UnderlyingSecurityHooks;
