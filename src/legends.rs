use serde_json::Value;

use crate::error::{Error, Result};
use crate::properties::PropertySet;

crate::grammar_class! {
    /// Styling of the individual parts of a legend.
    pub struct LegendProperties {
        title: PropertySet = "title";
        labels: PropertySet = "labels";
        symbols: PropertySet = "symbols";
        gradient: PropertySet = "gradient";
        legend: PropertySet = "legend";
    }
}

fn check_orient(value: &String) -> Result<()> {
    if value == "left" || value == "right" {
        Ok(())
    } else {
        Err(Error::invalid("Value must be one of \"left\" or \"right\"."))
    }
}

crate::grammar_class! {
    /// A legend visualizing one or more scales, referenced by name.
    pub struct Legend {
        size: String = "size";
        shape: String = "shape";
        fill: String = "fill";
        stroke: String = "stroke";
        orient: String = "orient" => check_orient;
        offset: i64 = "offset";
        title: String = "title";
        format: String = "format";
        values: Vec<Value> = "values";
        properties: LegendProperties = "properties";
    }
}

impl Legend {
    /// Scale names this legend visualizes.
    pub fn scales(&self) -> impl Iterator<Item = &str> {
        [self.size(), self.shape(), self.fill(), self.stroke()]
            .into_iter()
            .flatten()
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::grammar::GrammarValue;

    #[test]
    fn orient_is_left_or_right() {
        let mut legend = Legend::new();
        legend.set_orient("left").unwrap();
        let err = legend.set_orient("top").unwrap_err();
        assert_eq!(err.to_string(), "Value must be one of \"left\" or \"right\".");
        assert_eq!(legend.orient().unwrap(), "left");
    }

    #[test]
    fn scales_and_serialization() {
        let legend = Legend::new()
            .with_fill("color")
            .unwrap()
            .with_title("Series")
            .unwrap()
            .with_offset(0)
            .unwrap();

        assert_eq!(legend.scales().collect::<Vec<_>>(), ["color"]);
        assert_eq!(
            legend.to_json(),
            json!({"fill": "color", "title": "Series", "offset": 0})
        );
    }
}
