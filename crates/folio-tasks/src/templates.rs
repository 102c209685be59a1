//! Template engine for rendering reStructuredText outputs.

use folio_toc::{DfnItem, Table, TocEntry};
use minijinja::{context, Environment};
use serde::Serialize;

/// A toctree line.
#[derive(Debug, Clone, Serialize)]
pub struct TocLine {
    /// `Name <link>`, or the bare link when the entry has no name
    pub label: String,
}

/// A definition-list item with its cross-reference rendered.
#[derive(Debug, Clone, Serialize)]
pub struct DfnLine {
    pub reference: String,
    pub definition: String,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);

        for (name, source) in TEMPLATES {
            env.add_template_owned(name.to_string(), source.to_string())
                .expect("Failed to add built-in template");
        }

        Self { env }
    }

    /// Render a named template.
    pub fn render<S: Serialize>(&self, template: &str, ctx: S) -> Result<String, minijinja::Error> {
        self.env.get_template(template)?.render(ctx)
    }

    /// Render a hidden toctree of entries.
    pub fn render_toctree(&self, entries: &[TocEntry]) -> Result<String, minijinja::Error> {
        let lines: Vec<TocLine> = entries
            .iter()
            .map(|entry| TocLine {
                label: match &entry.fields.name {
                    Some(name) => format!("{} <{}>", name, entry.link()),
                    None => entry.link().to_string(),
                },
            })
            .collect();

        self.render("toctree.rst", context! { entries => lines })
    }

    /// Render a definition list linking each term to its document.
    pub fn render_dfn_list(&self, items: &[DfnItem]) -> Result<String, minijinja::Error> {
        let lines: Vec<DfnLine> = items
            .iter()
            .map(|item| DfnLine {
                reference: if item.term == item.target {
                    format!(":doc:`{}`", item.target)
                } else {
                    format!(":doc:`{} <{}>`", item.term, item.target)
                },
                definition: item.definition.clone(),
            })
            .collect();

        self.render("dfn-list.rst", context! { items => lines })
    }

    /// Render a list table; the header is the first row.
    pub fn render_table(&self, table: &Table) -> Result<String, minijinja::Error> {
        let rows: Vec<&Vec<String>> = std::iter::once(&table.header)
            .chain(table.rows.iter())
            .collect();

        self.render(
            "list-table.rst",
            context! {
                title => &table.title,
                widths => &table.widths,
                rows => rows,
            },
        )
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const TEMPLATES: &[(&str, &str)] = &[
    ("toctree.rst", TOCTREE_TEMPLATE),
    ("dfn-list.rst", DFN_LIST_TEMPLATE),
    ("list-table.rst", LIST_TABLE_TEMPLATE),
    ("steps.rst", STEPS_TEMPLATE),
    ("option.rst", OPTION_TEMPLATE),
    ("image.rst", IMAGE_TEMPLATE),
    ("release-curl.rst", RELEASE_CURL_TEMPLATE),
    ("release-untar.rst", RELEASE_UNTAR_TEMPLATE),
    ("release-copy.rst", RELEASE_COPY_TEMPLATE),
    ("hash.rst", HASH_TEMPLATE),
    ("includes.rst", INCLUDES_TEMPLATE),
];

const TOCTREE_TEMPLATE: &str = r#".. toctree::
   :titlesonly:
   :hidden:

{% for entry in entries %}
   {{ entry.label }}
{% endfor %}
"#;

const DFN_LIST_TEMPLATE: &str = r#".. class:: toc

{% for item in items %}
   {{ item.reference }}
      {{ item.definition | indent(6) }}

{% endfor %}
"#;

const LIST_TABLE_TEMPLATE: &str = r#"{% if title %}
.. list-table:: {{ title }}
{% else %}
.. list-table::
{% endif %}
   :header-rows: 1
{% if widths %}
   :widths: {{ widths | join(" ") }}
{% endif %}

{% for row in rows %}
   * - {{ row[0] | indent(7) }}
{% for cell in row[1:] %}
     - {{ cell | indent(7) }}
{% endfor %}

{% endfor %}
"#;

const STEPS_TEMPLATE: &str = r#"{% for step in steps %}
Step {{ step.number }}: {{ step.title }}
{{ step.underline }}

{% if step.pre %}
{{ step.pre }}

{% endif %}
{% if step.action %}
{% if step.action.pre %}
{{ step.action.pre }}

{% endif %}
.. code-block:: {{ step.action.language }}

   {{ step.action.code | indent(3) }}

{% endif %}
{% if step.post %}
{{ step.post }}

{% endif %}
{% endfor %}
"#;

const OPTION_TEMPLATE: &str = r#".. program:: {{ program }}

.. {{ directive }}:: {{ signature }}

   {{ description | indent(3) }}
{% if default %}

   *Default*: {{ default }}
{% endif %}
{% if kind %}

   *Type*: {{ kind }}
{% endif %}
"#;

const IMAGE_TEMPLATE: &str = r#".. figure:: /images/{{ name }}.png
   :alt: {{ alt }}
   :align: center
{% if width %}
   :figwidth: {{ width }}px
{% endif %}
"#;

const RELEASE_CURL_TEMPLATE: &str = r#".. code-block:: sh

   curl -O {{ base }}/{{ platform }}/{{ archive }}.tgz
"#;

const RELEASE_UNTAR_TEMPLATE: &str = r#".. code-block:: sh

   tar -zxvf {{ archive }}.tgz
"#;

const RELEASE_COPY_TEMPLATE: &str = r#".. code-block:: sh

   mkdir -p {{ product }}
   cp -R -n {{ archive }}/ {{ product }}
"#;

const HASH_TEMPLATE: &str = r#".. |commit| replace:: ``{{ commit }}``
"#;

const INCLUDES_TEMPLATE: &str = r#"Include Files
=============

{% for file in files %}
{{ file.heading }}
{{ file.underline }}

{% if file.description %}
{{ file.description }}

{% endif %}
{% if file.pages %}
Included in:

{% for page in file.pages %}
- :doc:`{{ page }}`
{% endfor %}

{% else %}
Not included in any page.

{% endif %}
{% endfor %}
"#;
