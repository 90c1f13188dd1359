//! Distribution parameter definitions and value sets.
//!
//! A distribution exposes a list of [`ParameterDefinition`]s. Some of them are
//! bound to the global spatial or temporal filter through a
//! [`ParameterProperty`]; [`ParameterDefinitions`] knows how to write a
//! bounding box or a time window into a [`ParameterValues`] set and how to
//! read it back.

use super::extent::{format_coordinate, parse_datetime, BoundingBox, TemporalRange};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Value type of a parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// Free text.
    #[default]
    String,
    /// Whole number.
    Integer,
    /// Decimal number.
    Float,
    /// `true` / `false`.
    Boolean,
    /// Calendar date.
    Date,
    /// Date and time.
    DateTime,
}

/// Binding of a parameter to a global filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterProperty {
    /// Upper latitude of the area.
    NorthernmostLatitude,
    /// Lower latitude of the area.
    SouthernmostLatitude,
    /// Right longitude of the area.
    EasternmostLongitude,
    /// Left longitude of the area.
    WesternmostLongitude,
    /// Whole area as `W,S,E,N`.
    BoundingBox,
    /// Start of the time window.
    StartDate,
    /// End of the time window.
    EndDate,
}

impl ParameterProperty {
    /// Whether the property is bound to the spatial filter.
    pub fn is_spatial(self) -> bool {
        !self.is_temporal()
    }

    /// Whether the property is bound to the temporal filter.
    pub fn is_temporal(self) -> bool {
        matches!(self, Self::StartDate | Self::EndDate)
    }
}

/// Definition of one distribution parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    /// Name used on the wire.
    pub name: String,
    /// Human readable label.
    #[serde(default)]
    pub label: String,
    /// Value type.
    #[serde(default)]
    pub kind: ParameterKind,
    /// Filter binding.
    #[serde(default)]
    pub property: Option<ParameterProperty>,
    /// Value used when nothing has been chosen.
    #[serde(default)]
    pub default_value: Option<String>,
    /// Allowed values for enumerated parameters.
    #[serde(default)]
    pub allowed_values: Vec<String>,
    /// Whether a value is mandatory.
    #[serde(default)]
    pub required: bool,
}

impl ParameterDefinition {
    /// Create a definition with only a name and kind.
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            kind,
            property: None,
            default_value: None,
            allowed_values: Vec::new(),
            required: false,
        }
    }

    /// Bind the definition to a filter property.
    pub fn with_property(mut self, property: ParameterProperty) -> Self {
        self.property = Some(property);
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Display label, falling back to the name.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }

    fn format_datetime(&self, value: NaiveDateTime) -> String {
        match self.kind {
            ParameterKind::Date => value.format("%Y-%m-%d").to_string(),
            _ => value.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        }
    }
}

/// A named parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterValue {
    /// Parameter name.
    pub name: String,
    /// Value as sent to the backend.
    pub value: String,
}

impl ParameterValue {
    /// Create a value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered set of parameter values, at most one per name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterValues(Vec<ParameterValue>);

impl ParameterValues {
    /// Create a set from values; a repeated name keeps its last value.
    pub fn new(values: impl IntoIterator<Item = ParameterValue>) -> Self {
        let mut set = Self::default();
        for v in values {
            set.set(v.name, v.value);
        }
        set
    }

    /// Default values for a list of definitions.
    pub fn defaults(definitions: &[ParameterDefinition]) -> Self {
        Self::new(definitions.iter().map(|d| {
            ParameterValue::new(d.name.clone(), d.default_value.clone().unwrap_or_default())
        }))
    }

    /// Value of a parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }

    /// Set a value, replacing an existing one or appending.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|v| v.name == name) {
            Some(existing) => existing.value = value,
            None => self.0.push(ParameterValue { name, value }),
        }
    }

    /// Values in order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterValue> {
        self.0.iter()
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names whose value differs between `self` and `other`, including names
    /// present on one side only.
    pub fn diff(&self, other: &ParameterValues) -> Vec<String> {
        let mut changed: Vec<String> = self
            .0
            .iter()
            .filter(|v| other.get(&v.name) != Some(v.value.as_str()))
            .map(|v| v.name.clone())
            .collect();
        changed.extend(
            other
                .0
                .iter()
                .filter(|v| self.get(&v.name).is_none())
                .map(|v| v.name.clone()),
        );
        changed
    }
}

impl From<Vec<ParameterValue>> for ParameterValues {
    fn from(values: Vec<ParameterValue>) -> Self {
        Self::new(values)
    }
}

/// The parameter definitions of one distribution, with the filter rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterDefinitions(Vec<ParameterDefinition>);

impl ParameterDefinitions {
    /// Wrap a list of definitions.
    pub fn new(definitions: Vec<ParameterDefinition>) -> Self {
        Self(definitions)
    }

    /// Definitions in order.
    pub fn as_slice(&self) -> &[ParameterDefinition] {
        &self.0
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<&ParameterDefinition> {
        self.0.iter().find(|d| d.name == name)
    }

    fn with_property(&self, property: ParameterProperty) -> Option<&ParameterDefinition> {
        self.0.iter().find(|d| d.property == Some(property))
    }

    /// Whether any definition is bound to the spatial filter.
    pub fn has_spatial(&self) -> bool {
        self.0
            .iter()
            .any(|d| d.property.is_some_and(ParameterProperty::is_spatial))
    }

    /// Whether any definition is bound to the temporal filter.
    pub fn has_temporal(&self) -> bool {
        self.0
            .iter()
            .any(|d| d.property.is_some_and(ParameterProperty::is_temporal))
    }

    /// Write a bounding box into the spatial parameters of `values`.
    pub fn apply_bounding_box(&self, values: &ParameterValues, bbox: &BoundingBox) -> ParameterValues {
        let mut updated = values.clone();
        for def in &self.0 {
            let value = match def.property {
                Some(ParameterProperty::NorthernmostLatitude) => format_coordinate(bbox.north),
                Some(ParameterProperty::SouthernmostLatitude) => format_coordinate(bbox.south),
                Some(ParameterProperty::EasternmostLongitude) => format_coordinate(bbox.east),
                Some(ParameterProperty::WesternmostLongitude) => format_coordinate(bbox.west),
                Some(ParameterProperty::BoundingBox) => bbox.to_string(),
                _ => continue,
            };
            updated.set(def.name.clone(), value);
        }
        updated
    }

    /// Read the bounding box encoded in the spatial parameters of `values`.
    pub fn bounding_box(&self, values: &ParameterValues) -> Option<BoundingBox> {
        if let Some(def) = self.with_property(ParameterProperty::BoundingBox) {
            return values.get(&def.name).and_then(|v| v.parse().ok());
        }

        let coord = |property| -> Option<f64> {
            let def = self.with_property(property)?;
            values.get(&def.name)?.trim().parse().ok()
        };
        BoundingBox::new(
            coord(ParameterProperty::WesternmostLongitude)?,
            coord(ParameterProperty::SouthernmostLatitude)?,
            coord(ParameterProperty::EasternmostLongitude)?,
            coord(ParameterProperty::NorthernmostLatitude)?,
        )
        .ok()
    }

    /// Write a time window into the temporal parameters of `values`.
    ///
    /// An open end clears the corresponding parameter.
    pub fn apply_temporal_range(
        &self,
        values: &ParameterValues,
        range: &TemporalRange,
    ) -> ParameterValues {
        let mut updated = values.clone();
        for def in &self.0 {
            let bound = match def.property {
                Some(ParameterProperty::StartDate) => range.start,
                Some(ParameterProperty::EndDate) => range.end,
                _ => continue,
            };
            let value = bound.map(|b| def.format_datetime(b)).unwrap_or_default();
            updated.set(def.name.clone(), value);
        }
        updated
    }

    /// Read the time window encoded in the temporal parameters of `values`.
    pub fn temporal_range(&self, values: &ParameterValues) -> Option<TemporalRange> {
        if !self.has_temporal() {
            return None;
        }
        let bound = |property| -> Option<NaiveDateTime> {
            let def = self.with_property(property)?;
            parse_datetime(values.get(&def.name)?)
        };
        TemporalRange::new(
            bound(ParameterProperty::StartDate),
            bound(ParameterProperty::EndDate),
        )
        .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn corner_definitions() -> ParameterDefinitions {
        ParameterDefinitions::new(vec![
            ParameterDefinition::new("maxlat", ParameterKind::Float)
                .with_property(ParameterProperty::NorthernmostLatitude),
            ParameterDefinition::new("minlat", ParameterKind::Float)
                .with_property(ParameterProperty::SouthernmostLatitude),
            ParameterDefinition::new("maxlon", ParameterKind::Float)
                .with_property(ParameterProperty::EasternmostLongitude),
            ParameterDefinition::new("minlon", ParameterKind::Float)
                .with_property(ParameterProperty::WesternmostLongitude),
            ParameterDefinition::new("starttime", ParameterKind::Date)
                .with_property(ParameterProperty::StartDate),
            ParameterDefinition::new("endtime", ParameterKind::DateTime)
                .with_property(ParameterProperty::EndDate),
            ParameterDefinition::new("format", ParameterKind::String).with_default("json"),
        ])
    }

    #[test]
    fn set_replaces_in_place() {
        let mut values = ParameterValues::new([
            ParameterValue::new("a", "1"),
            ParameterValue::new("b", "2"),
        ]);
        values.set("a", "3");
        values.set("c", "4");

        let names: Vec<&str> = values.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(values.get("a"), Some("3"));
    }

    #[test]
    fn diff_reports_changed_and_one_sided_names() {
        let current = ParameterValues::new([
            ParameterValue::new("a", "1"),
            ParameterValue::new("b", "2"),
        ]);
        let staged = ParameterValues::new([
            ParameterValue::new("a", "1"),
            ParameterValue::new("b", "5"),
            ParameterValue::new("c", "6"),
        ]);
        assert_eq!(current.diff(&staged), vec!["b".to_string(), "c".to_string()]);
        assert!(current.diff(&current.clone()).is_empty());
    }

    #[test]
    fn defaults_use_definition_defaults() {
        let defs = corner_definitions();
        let values = ParameterValues::defaults(defs.as_slice());
        assert_eq!(values.len(), 7);
        assert_eq!(values.get("format"), Some("json"));
        assert_eq!(values.get("maxlat"), Some(""));
    }

    #[test]
    fn bounding_box_round_trips_through_corner_parameters() {
        let defs = corner_definitions();
        let bbox = BoundingBox::new(-10.0, 35.5, 30.0, 70.0).unwrap();
        let values = defs.apply_bounding_box(&ParameterValues::defaults(defs.as_slice()), &bbox);

        assert_eq!(values.get("minlat"), Some("35.5"));
        assert_eq!(values.get("minlon"), Some("-10"));
        assert_eq!(defs.bounding_box(&values), Some(bbox));
        assert!(defs.has_spatial());
    }

    #[test]
    fn bounding_box_parameter_uses_wsen() {
        let defs = ParameterDefinitions::new(vec![ParameterDefinition::new(
            "bbox",
            ParameterKind::String,
        )
        .with_property(ParameterProperty::BoundingBox)]);
        let bbox = BoundingBox::new(1.0, 1.0, 2.0, 2.0).unwrap();
        let values = defs.apply_bounding_box(&ParameterValues::default(), &bbox);

        assert_eq!(values.get("bbox"), Some("1,1,2,2"));
        assert_eq!(defs.bounding_box(&values), Some(bbox));
        assert!(!defs.has_temporal());
    }

    #[test]
    fn temporal_range_formats_by_kind() {
        let defs = corner_definitions();
        let range = TemporalRange::parse("2020-01-01/2020-06-30T12:30:00Z").unwrap();
        let values = defs.apply_temporal_range(&ParameterValues::default(), &range);

        assert_eq!(values.get("starttime"), Some("2020-01-01"));
        assert_eq!(values.get("endtime"), Some("2020-06-30T12:30:00Z"));
        assert_eq!(defs.temporal_range(&values), Some(range));

        let open = TemporalRange::new(range.start, None).unwrap();
        let cleared = defs.apply_temporal_range(&values, &open);
        assert_eq!(cleared.get("endtime"), Some(""));
    }
}
