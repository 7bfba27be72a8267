use std::{fmt, io};

use serde::Serialize;

use crate::compiler::ast::Node;
use crate::compiler::parser::parse;
use crate::error::Error;
use crate::output::{Output, WriteWrapper};
use crate::renderer::render_nodes;
use crate::value::Value;

/// Represents a parsed template.
///
/// Parsing happens once when the template is created, rendering can then
/// happen any number of times, also from multiple threads at once.
///
/// ```
/// # use crtmpl::{Template, context};
/// let tmpl = Template::new("{/items}<li>{.}</li>{/items}").unwrap();
/// assert_eq!(
///     tmpl.render(context!(items => vec![1, 2])).unwrap(),
///     "<li>1</li><li>2</li>"
/// );
/// ```
pub struct Template<'source> {
    name: Option<&'source str>,
    source: &'source str,
    nodes: Vec<Node<'source>>,
}

impl fmt::Debug for Template<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ds = f.debug_struct("Template");
        ds.field("name", &self.name);
        #[cfg(feature = "unstable_machinery")]
        {
            ds.field("nodes", &self.nodes);
        }
        ds.finish()
    }
}

impl<'source> Template<'source> {
    /// Parses a template from a string.
    ///
    /// Fails with [`ErrorKind::SyntaxError`](crate::ErrorKind::SyntaxError)
    /// if the braces are malformed.
    pub fn new(source: &'source str) -> Result<Template<'source>, Error> {
        Template::_new(None, source)
    }

    /// Parses a template and gives it a name.
    ///
    /// The name shows up in error messages.  Typically this is the path
    /// of the file the template was loaded from.
    pub fn named(name: &'source str, source: &'source str) -> Result<Template<'source>, Error> {
        Template::_new(Some(name), source)
    }

    fn _new(name: Option<&'source str>, source: &'source str) -> Result<Template<'source>, Error> {
        let nodes = parse(source).map_err(|mut err| {
            err.attach_template(name, source);
            err
        })?;
        Ok(Template {
            name,
            source,
            nodes,
        })
    }

    /// Returns the name of the template.
    pub fn name(&self) -> Option<&str> {
        self.name
    }

    /// Returns the source code of the template.
    pub fn source(&self) -> &str {
        self.source
    }

    /// Returns the parsed nodes.
    #[cfg(feature = "unstable_machinery")]
    pub fn nodes(&self) -> &[Node<'source>] {
        &self.nodes
    }

    /// Renders the template into a string.
    ///
    /// The bindings are converted with [`Value::from_serialize`], typically
    /// they are created with the [`context!`](crate::context) macro or come
    /// from a struct deriving [`Serialize`].  Paths without a leading dot
    /// are looked up in them.
    ///
    /// **Note on values:** The [`Value`] type implements `Serialize` and can be
    /// passed to render as well.
    pub fn render<S: Serialize>(&self, bindings: S) -> Result<String, Error> {
        // reduce total amount of code falling under mono morphization into
        // this function, and share the rest in _eval.
        let mut rv = String::with_capacity(self.source.len());
        self._eval(Value::from_serialize(&bindings), &mut Output::new(&mut rv))
            .map(|_| rv)
    }

    /// Renders the template into an [`io::Write`].
    ///
    /// This works exactly like [`render`](Self::render) but writes the
    /// output as it's produced.  If rendering fails part of the output
    /// might already have been written.
    ///
    /// ```
    /// # use crtmpl::{Template, context};
    /// let tmpl = Template::new("Hello {name}!").unwrap();
    /// let mut buf = Vec::new();
    /// tmpl.render_to_write(context!(name => "John"), &mut buf).unwrap();
    /// assert_eq!(buf, b"Hello John!");
    /// ```
    pub fn render_to_write<S: Serialize, W: io::Write>(
        &self,
        bindings: S,
        w: W,
    ) -> Result<(), Error> {
        let mut wrapper = WriteWrapper { w, err: None };
        self._eval(
            Value::from_serialize(&bindings),
            &mut Output::new(&mut wrapper),
        )
        .map_err(|err| wrapper.take_err(err))
    }

    fn _eval(&self, bindings: Value, out: &mut Output) -> Result<(), Error> {
        bindings
            .validate()
            .and_then(|_| render_nodes(&self.nodes, &Value::from(()), &bindings, out))
            .map_err(|mut err| {
                err.attach_template(self.name, self.source);
                err
            })
    }
}

/// Renders a template string with the given bindings.
///
/// This parses the template on every call.  Use [`Template`] to parse
/// once and render many times.
///
/// ```
/// # use crtmpl::{render, context};
/// let rv = render("{/items}{.}{/items}", context!(items => vec![1, 2, 3])).unwrap();
/// assert_eq!(rv, "123");
/// ```
pub fn render<S: Serialize>(source: &str, bindings: S) -> Result<String, Error> {
    Template::new(source)?.render(bindings)
}
