//! Partition of a part's elements into homogeneous
//! (type, section, orientation) buckets, one solver element block each.

use log::warn;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::elements::ElementType;
use crate::geometry::GeometricKey;
use crate::part::Part;

/// Identity of a bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub element_type: ElementType,
    pub section: String,
    /// Quantized orientation; `None` for elements without one
    pub orientation: Option<GeometricKey>,
}

impl Ord for BucketKey {
    /// Type name, then section name, then orientation (`None` first)
    fn cmp(&self, other: &Self) -> Ordering {
        self.element_type
            .as_str()
            .cmp(other.element_type.as_str())
            .then_with(|| self.section.cmp(&other.section))
            .then_with(|| self.orientation.cmp(&other.orientation))
    }
}

impl PartialOrd for BucketKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A bucket with its elements in ascending key order
#[derive(Debug, Clone)]
pub struct Bucket {
    pub key: BucketKey,
    /// Orientation vector of the lowest-keyed element in the bucket
    pub orientation: Option<[f64; 3]>,
    pub elements: Vec<usize>,
}

impl Bucket {
    /// Synthesized element set name: `aux_{type}_{section}[_{orientation}]`
    pub fn elset_name(&self) -> String {
        match &self.key.orientation {
            Some(o) => format!("aux_{}_{}_{}", self.key.element_type, self.key.section, o.label()),
            None => format!("aux_{}_{}", self.key.element_type, self.key.section),
        }
    }
}

type OrientationMap = HashMap<Option<GeometricKey>, Vec<usize>>;

/// `type -> section -> orientation -> elements`
#[derive(Debug, Clone, Default)]
pub struct ElementGrouping {
    partition: HashMap<ElementType, HashMap<String, OrientationMap>>,
    orientations: HashMap<BucketKey, [f64; 3]>,
}

impl ElementGrouping {
    /// Number of distinct (type, section, orientation) buckets
    pub fn len(&self) -> usize {
        self.partition
            .values()
            .flat_map(HashMap::values)
            .map(HashMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of grouped elements
    pub fn element_count(&self) -> usize {
        self.partition
            .values()
            .flat_map(HashMap::values)
            .flat_map(HashMap::values)
            .map(Vec::len)
            .sum()
    }

    /// Elements of one bucket, unordered
    pub fn get(
        &self,
        element_type: ElementType,
        section: &str,
        orientation: Option<GeometricKey>,
    ) -> Option<&[usize]> {
        self.partition
            .get(&element_type)?
            .get(section)?
            .get(&orientation)
            .map(Vec::as_slice)
    }

    /// All buckets in total order, elements sorted by key
    pub fn buckets(&self) -> Vec<Bucket> {
        let mut buckets: Vec<Bucket> = self
            .partition
            .iter()
            .flat_map(|(etype, sections)| {
                sections.iter().flat_map(move |(section, orientations)| {
                    orientations.iter().map(move |(orientation, elements)| {
                        let key = BucketKey {
                            element_type: *etype,
                            section: section.clone(),
                            orientation: *orientation,
                        };
                        let mut elements = elements.clone();
                        elements.sort_unstable();
                        Bucket {
                            orientation: self.orientations.get(&key).copied(),
                            key,
                            elements,
                        }
                    })
                })
            })
            .collect();
        buckets.sort_by(|a, b| a.key.cmp(&b.key));
        buckets
    }
}

/// Group the elements of `part`. Orientation vectors are compared after
/// quantizing at the part's geometric-key precision.
pub fn group_elements(part: &Part) -> ElementGrouping {
    let precision = part.config().precision;
    let mut grouping = ElementGrouping::default();
    for (key, element) in part.elements().iter().enumerate() {
        let element_type = match element.element_type() {
            Ok(etype) => etype,
            Err(err) => {
                warn!("Part '{}': element {} left out of grouping: {}", part.name(), key, err);
                continue;
            }
        };
        let orientation = element.orientation_key(precision);
        grouping
            .partition
            .entry(element_type)
            .or_default()
            .entry(element.section_name().to_string())
            .or_default()
            .entry(orientation)
            .or_default()
            .push(key);

        if let Some(vector) = element.orientation {
            let bucket = BucketKey {
                element_type,
                section: element.section_name().to_string(),
                orientation,
            };
            // keys ascend, so the first insert is the lowest key
            grouping.orientations.entry(bucket).or_insert(vector);
        }
    }
    grouping
}
