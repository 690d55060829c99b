//! Notebook fixture tests

use docjson_babel::{FormatError, FormatRegistry, Projection, ProjectionOptions};
use std::path::Path;

#[test]
fn fixture_renders_to_markdown() {
    let registry = FormatRegistry::default();
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/analysis.ipynb");
    let projection = registry
        .project_file(&path, &ProjectionOptions::default())
        .unwrap()
        .expect("ipynb is a recognised extension");

    let expected = "\
# Analysis

Load the data.

```python
print('hi')
6 * 7
```

    hi

    42

![png](output_1_2.png)";
    assert_eq!(projection, Projection::flat(expected));
}

#[test]
fn old_nbformat_is_a_parse_error() {
    let registry = FormatRegistry::default();
    let result = registry.project(
        r#"{"nbformat": 3, "metadata": {}, "worksheets": []}"#,
        "notebook",
        &ProjectionOptions::default(),
    );
    assert!(matches!(result, Err(FormatError::ParseError(_))));
}
