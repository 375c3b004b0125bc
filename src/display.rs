//! HTML for embedding a visualization in a notebook page.

use crate::error::Result;
use crate::output::JsonOptions;
use crate::visualization::Visualization;

pub const D3_JS_URL: &str = "http://trifacta.github.com/vega/d3.v3.min.js";
pub const VEGA_JS_URL: &str = "http://trifacta.github.com/vega/vega.js";

/// Event fired once the scripts from [`notebook_init_html`] have loaded.
const LIBS_LOADED_EVENT: &str = "vegabuild_libs_loaded";

/// Script tags loading d3 and vega. Emit once per page, before any fragment.
pub fn notebook_init_html() -> String {
    format!(
        r#"<script src="{D3_JS_URL}"></script>
<script src="{VEGA_JS_URL}"></script>
<script>window.dispatchEvent(new Event("{LIBS_LOADED_EVENT}"));</script>"#
    )
}

impl Visualization {
    /// A `<div>` plus the script rendering this visualization into it.
    ///
    /// The element id is random, so fragments for several visualizations can share a page.
    pub fn to_html_fragment(&self) -> Result<String> {
        let id = format!("vis{:016x}", rand::random::<u64>());
        let spec = self.to_json(&JsonOptions {
            pretty: false,
            validate: false,
        })?;
        Ok(format!(
            r##"<div id="{id}"></div>
<script>
   ( function() {{
     var _do_plot = function() {{
       if (typeof vg === 'undefined') {{
         window.addEventListener('{LIBS_LOADED_EVENT}', _do_plot)
         return;
       }}
       vg.parse.spec({spec}, function(chart) {{
         chart({{el: "#{id}"}}).update();
       }});
     }};
     _do_plot();
   }})();
</script>
<style>.vega canvas {{width: 100%;}}</style>"##
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_embeds_compact_json() {
        let mut vis = Visualization::new();
        vis.set_width(100).unwrap();
        let html = vis.to_html_fragment().unwrap();

        assert!(html.starts_with("<div id=\"vis"));
        assert!(html.contains("vg.parse.spec({\"data\":[]"));
        assert!(html.contains("\"width\":100}"));
        let id = &html["<div id=\"".len()..html.find("\"></div>").unwrap()];
        assert!(html.contains(&format!("chart({{el: \"#{id}\"}}).update();")));
        assert!(html.trim_end().ends_with("</style>"));
    }

    #[test]
    fn fragment_ids_differ() {
        let vis = Visualization::new();
        let first = vis.to_html_fragment().unwrap();
        let second = vis.to_html_fragment().unwrap();
        assert_ne!(first.lines().next(), second.lines().next());
    }

    #[test]
    fn init_loads_both_libraries() {
        let html = notebook_init_html();
        assert!(html.contains(D3_JS_URL));
        assert!(html.contains(VEGA_JS_URL));
    }
}
