use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use workwear_core::{Aggregate, DomainError, DomainResult, GarmentType, Size, ensure_positive};

/// Identity of a stock record: at most one record per (type, size).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StockKey {
    pub garment_type: GarmentType,
    pub size: Size,
}

impl StockKey {
    pub fn new(garment_type: GarmentType, size: Size) -> Self {
        Self { garment_type, size }
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({})", self.garment_type, self.size)
    }
}

/// One row of the stock table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub garment_type: GarmentType,
    pub size: Size,
    pub quantity: u32,
}

impl StockRecord {
    pub fn key(&self) -> StockKey {
        StockKey::new(self.garment_type.clone(), self.size.clone())
    }
}

/// A stock record annotated for the stock listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLine {
    #[serde(flatten)]
    pub record: StockRecord,
    /// Quantity is below the configured low-stock threshold.
    pub low_stock: bool,
}

/// Command: AddStock (stock-in).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddStock {
    pub garment_type: GarmentType,
    pub size: Size,
    pub quantity: u32,
}

/// Command: IssueStock (checkout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStock {
    pub garment_type: GarmentType,
    pub size: Size,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockCommand {
    AddStock(AddStock),
    IssueStock(IssueStock),
}

/// Event: StockAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdded {
    pub key: StockKey,
    pub quantity: u32,
    /// Quantity on hand after the addition.
    pub on_hand: u32,
}

/// Event: StockIssued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockIssued {
    pub key: StockKey,
    pub quantity: u32,
    /// Quantity left after the issue; 0 means the record is gone.
    pub remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockEvent {
    StockAdded(StockAdded),
    StockIssued(StockIssued),
}

impl StockEvent {
    /// Quantity on hand for the event's key once it has been applied.
    pub fn resulting_quantity(&self) -> u32 {
        match self {
            StockEvent::StockAdded(e) => e.on_hand,
            StockEvent::StockIssued(e) => e.remaining,
        }
    }
}

/// The stock table: (type, size) → quantity on hand.
///
/// Every stored quantity is at least 1. A record that reaches 0 through an
/// issue is removed, so absence of a key means "no stock".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryStore {
    records: BTreeMap<StockKey, u32>,
    version: u64,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the table from persisted rows.
    ///
    /// Rows with quantity 0 carry no stock and are skipped. Rows sharing a key
    /// are merged by summing their quantities.
    pub fn from_records(records: impl IntoIterator<Item = StockRecord>) -> DomainResult<Self> {
        let mut map: BTreeMap<StockKey, u32> = BTreeMap::new();
        for record in records {
            if record.quantity == 0 {
                continue;
            }
            let key = record.key();
            let slot = map.entry(key).or_insert(0);
            *slot = slot
                .checked_add(record.quantity)
                .ok_or_else(|| DomainError::validation("stock quantity overflow"))?;
        }
        Ok(Self {
            records: map,
            version: 0,
        })
    }

    /// Snapshot of all records, ordered by type then size.
    pub fn records(&self) -> Vec<StockRecord> {
        self.records
            .iter()
            .map(|(key, quantity)| StockRecord {
                garment_type: key.garment_type.clone(),
                size: key.size.clone(),
                quantity: *quantity,
            })
            .collect()
    }

    /// Stock listing; records with quantity below `threshold` are flagged.
    pub fn stock_lines(&self, threshold: u32) -> Vec<StockLine> {
        self.records()
            .into_iter()
            .map(|record| StockLine {
                low_stock: record.quantity < threshold,
                record,
            })
            .collect()
    }

    pub fn quantity(&self, garment_type: &GarmentType, size: &Size) -> Option<u32> {
        self.records
            .get(&StockKey::new(garment_type.clone(), size.clone()))
            .copied()
    }

    /// Distinct types with stock, sorted. Keys order by type first, so
    /// duplicates are adjacent and skipped.
    pub fn stocked_types(&self) -> impl Iterator<Item = &GarmentType> {
        let mut last: Option<&GarmentType> = None;
        self.records.keys().filter_map(move |key| {
            if last == Some(&key.garment_type) {
                return None;
            }
            last = Some(&key.garment_type);
            Some(&key.garment_type)
        })
    }

    /// Sizes with stock for one type, sorted.
    pub fn list_sizes(&self, garment_type: &GarmentType) -> Vec<Size> {
        self.records
            .keys()
            .filter(|key| key.garment_type == *garment_type)
            .map(|key| key.size.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stock-in. Returns the quantity on hand afterwards.
    pub fn add_stock(&mut self, garment_type: GarmentType, size: Size, quantity: u32) -> DomainResult<u32> {
        let events = self.execute(&StockCommand::AddStock(AddStock {
            garment_type,
            size,
            quantity,
        }))?;
        Ok(events.last().map(StockEvent::resulting_quantity).unwrap_or(0))
    }

    /// Checkout. Returns the quantity left afterwards.
    pub fn issue_stock(&mut self, garment_type: GarmentType, size: Size, quantity: u32) -> DomainResult<u32> {
        let events = self.execute(&StockCommand::IssueStock(IssueStock {
            garment_type,
            size,
            quantity,
        }))?;
        Ok(events.last().map(StockEvent::resulting_quantity).unwrap_or(0))
    }

    fn handle_add(&self, cmd: &AddStock) -> DomainResult<Vec<StockEvent>> {
        ensure_positive(cmd.quantity, "quantity")?;

        let key = StockKey::new(cmd.garment_type.clone(), cmd.size.clone());
        let current = self.records.get(&key).copied().unwrap_or(0);
        let on_hand = current
            .checked_add(cmd.quantity)
            .ok_or_else(|| DomainError::validation("stock quantity overflow"))?;

        Ok(vec![StockEvent::StockAdded(StockAdded {
            key,
            quantity: cmd.quantity,
            on_hand,
        })])
    }

    fn handle_issue(&self, cmd: &IssueStock) -> DomainResult<Vec<StockEvent>> {
        ensure_positive(cmd.quantity, "quantity")?;

        let key = StockKey::new(cmd.garment_type.clone(), cmd.size.clone());
        let Some(available) = self.records.get(&key).copied() else {
            return Err(DomainError::no_such_item(
                cmd.garment_type.as_str(),
                cmd.size.as_str(),
            ));
        };

        if available < cmd.quantity {
            return Err(DomainError::insufficient_stock(cmd.quantity, available));
        }

        Ok(vec![StockEvent::StockIssued(StockIssued {
            key,
            quantity: cmd.quantity,
            remaining: available - cmd.quantity,
        })])
    }
}

impl Aggregate for InventoryStore {
    type Command = StockCommand;
    type Event = StockEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            StockEvent::StockAdded(e) => {
                self.records.insert(e.key.clone(), e.on_hand);
            }
            StockEvent::StockIssued(e) => {
                if e.remaining == 0 {
                    self.records.remove(&e.key);
                } else {
                    self.records.insert(e.key.clone(), e.remaining);
                }
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            StockCommand::AddStock(cmd) => self.handle_add(cmd),
            StockCommand::IssueStock(cmd) => self.handle_issue(cmd),
        }
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(s: &str) -> GarmentType {
        GarmentType::new(s).unwrap()
    }

    fn size(s: &str) -> Size {
        Size::new(s).unwrap()
    }

    #[test]
    fn add_then_issue_leaves_the_difference() {
        let mut store = InventoryStore::new();
        assert_eq!(store.add_stock(ty("Jacket"), size("M"), 10).unwrap(), 10);
        assert_eq!(store.issue_stock(ty("Jacket"), size("M"), 3).unwrap(), 7);
        assert_eq!(store.quantity(&ty("Jacket"), &size("M")), Some(7));
    }

    #[test]
    fn add_increments_existing_record() {
        let mut store = InventoryStore::new();
        store.add_stock(ty("Jacket"), size("M"), 2).unwrap();
        assert_eq!(store.add_stock(ty("Jacket"), size("M"), 5).unwrap(), 7);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn insufficient_stock_leaves_quantity_unchanged() {
        let mut store = InventoryStore::new();
        store.add_stock(ty("Jacket"), size("M"), 3).unwrap();
        let before = store.clone();

        let err = store.issue_stock(ty("Jacket"), size("M"), 5).unwrap_err();
        assert_eq!(err, DomainError::insufficient_stock(5, 3));
        assert_eq!(store, before);
        assert_eq!(store.quantity(&ty("Jacket"), &size("M")), Some(3));
    }

    #[test]
    fn issue_from_empty_store_is_no_such_item() {
        let mut store = InventoryStore::new();
        let err = store.issue_stock(ty("Boots"), size("42"), 1).unwrap_err();
        assert_eq!(err, DomainError::no_such_item("Boots", "42"));
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn issuing_everything_removes_the_record() {
        let mut store = InventoryStore::new();
        store.add_stock(ty("Jacket"), size("M"), 5).unwrap();
        store.add_stock(ty("Jacket"), size("L"), 1).unwrap();

        assert_eq!(store.issue_stock(ty("Jacket"), size("M"), 5).unwrap(), 0);
        assert_eq!(store.list_sizes(&ty("Jacket")), vec![size("L")]);
        assert_eq!(store.quantity(&ty("Jacket"), &size("M")), None);

        // A removed key behaves like one that never existed.
        let err = store.issue_stock(ty("Jacket"), size("M"), 1).unwrap_err();
        assert!(matches!(err, DomainError::NoSuchItem { .. }));
    }

    #[test]
    fn zero_quantity_is_rejected_for_both_directions() {
        let mut store = InventoryStore::new();
        assert!(matches!(
            store.add_stock(ty("Jacket"), size("M"), 0),
            Err(DomainError::Validation(_))
        ));
        store.add_stock(ty("Jacket"), size("M"), 1).unwrap();
        assert!(matches!(
            store.issue_stock(ty("Jacket"), size("M"), 0),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn overflow_is_rejected_without_change() {
        let mut store = InventoryStore::new();
        store.add_stock(ty("Socks"), size("40"), u32::MAX).unwrap();
        assert!(store.add_stock(ty("Socks"), size("40"), 1).is_err());
        assert_eq!(store.quantity(&ty("Socks"), &size("40")), Some(u32::MAX));
    }

    #[test]
    fn listings_are_sorted_distinct_and_repeatable() {
        let mut store = InventoryStore::new();
        store.add_stock(ty("Jacket"), size("M"), 1).unwrap();
        store.add_stock(ty("Boots"), size("42"), 1).unwrap();
        store.add_stock(ty("Jacket"), size("L"), 1).unwrap();

        let first: Vec<GarmentType> = store.stocked_types().cloned().collect();
        assert_eq!(first, vec![ty("Boots"), ty("Jacket")]);
        assert_eq!(store.stocked_types().cloned().collect::<Vec<_>>(), first);
        assert_eq!(store.list_sizes(&ty("Jacket")), vec![size("L"), size("M")]);
        assert!(store.list_sizes(&ty("Gloves")).is_empty());
    }

    #[test]
    fn stock_lines_flag_quantities_below_threshold() {
        let mut store = InventoryStore::new();
        store.add_stock(ty("Jacket"), size("M"), 4).unwrap();
        store.add_stock(ty("Jacket"), size("L"), 5).unwrap();

        let flags: Vec<(String, bool)> = store
            .stock_lines(5)
            .into_iter()
            .map(|line| (line.record.size.into_inner(), line.low_stock))
            .collect();
        assert_eq!(flags, vec![("L".to_string(), false), ("M".to_string(), true)]);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let mut store = InventoryStore::new();
        store.add_stock(ty("Jacket"), size("M"), 4).unwrap();
        let before = store.clone();

        let cmd = StockCommand::IssueStock(IssueStock {
            garment_type: ty("Jacket"),
            size: size("M"),
            quantity: 4,
        });
        let events1 = store.handle(&cmd).unwrap();
        let events2 = store.handle(&cmd).unwrap();

        assert_eq!(events1, events2);
        assert_eq!(store, before);
    }

    #[test]
    fn from_records_skips_zero_rows_and_merges_duplicates() {
        let store = InventoryStore::from_records([
            StockRecord { garment_type: ty("Jacket"), size: size("M"), quantity: 2 },
            StockRecord { garment_type: ty("Jacket"), size: size("M"), quantity: 3 },
            StockRecord { garment_type: ty("Gloves"), size: size("L"), quantity: 0 },
        ])
        .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.quantity(&ty("Jacket"), &size("M")), Some(5));
        assert_eq!(store.version(), 0);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashMap;

        #[derive(Debug, Clone)]
        enum Op {
            Add(usize, u32),
            Issue(usize, u32),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0usize..4, 1u32..20).prop_map(|(k, q)| Op::Add(k, q)),
                (0usize..4, 0u32..25).prop_map(|(k, q)| Op::Issue(k, q)),
            ]
        }

        const KEYS: [(&str, &str); 4] = [("Jacket", "M"), ("Jacket", "L"), ("Boots", "42"), ("Vest", "XL")];

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: for any sequence of stock-ins and checkouts, the table
            /// agrees with a plain signed model that never goes below zero, and
            /// no zero-quantity record is ever retained.
            #[test]
            fn quantities_never_go_negative(ops in prop::collection::vec(op_strategy(), 1..60)) {
                let mut store = InventoryStore::new();
                let mut model: HashMap<usize, i64> = HashMap::new();

                for op in ops {
                    match op {
                        Op::Add(k, q) => {
                            let (t, s) = KEYS[k];
                            store.add_stock(ty(t), size(s), q).unwrap();
                            *model.entry(k).or_insert(0) += i64::from(q);
                        }
                        Op::Issue(k, q) => {
                            let (t, s) = KEYS[k];
                            let before = store.clone();
                            let have = model.get(&k).copied().unwrap_or(0);
                            match store.issue_stock(ty(t), size(s), q) {
                                Ok(left) => {
                                    prop_assert!(q >= 1 && i64::from(q) <= have);
                                    model.insert(k, have - i64::from(q));
                                    prop_assert_eq!(i64::from(left), have - i64::from(q));
                                }
                                Err(_) => prop_assert_eq!(&store, &before),
                            }
                        }
                    }

                    for record in store.records() {
                        prop_assert!(record.quantity >= 1);
                    }
                    for (k, (t, s)) in KEYS.iter().enumerate() {
                        let expected = model.get(&k).copied().unwrap_or(0);
                        prop_assert!(expected >= 0);
                        let actual = store.quantity(&ty(t), &size(s)).map(i64::from).unwrap_or(0);
                        prop_assert_eq!(actual, expected);
                    }
                }
            }
        }
    }
}
