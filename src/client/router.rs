//! Path patterns and in-app navigation.
//!
//! Matching is a pure function over an ordered list of [`Route`]s, see
//! [`match_route`]. [`Navigator`] adds a history stack on top and tells its
//! subscribers about every resolution.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex_lite::Regex;

/// Named parameters bound by a match.
pub type Params = BTreeMap<String, String>;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":(\w+)").expect("placeholder pattern is valid")
});

/// Path template such as `/post/:id`.
#[derive(Debug, Clone)]
pub struct Pattern {
    path: String,
    regex: Regex,
    names: Vec<String>,
}

impl Pattern {
    /// Compile `path`, every `:name` segment matching any non-empty text.
    pub fn new(path: &str) -> Result<Self, regex_lite::Error> {
        let mut expression = String::from("^");
        let mut names = Vec::new();
        let mut last = 0;
        for captures in PLACEHOLDER.captures_iter(path) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1))
            else {
                continue;
            };
            expression.push_str(&regex_lite::escape(&path[last..whole.start()]));
            expression.push_str("(.+)");
            names.push(name.as_str().to_owned());
            last = whole.end();
        }
        expression.push_str(&regex_lite::escape(&path[last..]));
        expression.push('$');

        Ok(Self {
            path: path.to_owned(),
            regex: Regex::new(&expression)?,
            names,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parameters bound when `location` matches as a whole.
    pub fn matches(&self, location: &str) -> Option<Params> {
        let captures = self.regex.captures(location)?;

        Some(
            self.names
                .iter()
                .zip(captures.iter().skip(1))
                .filter_map(|(name, value)| {
                    value.map(|value| (name.clone(), value.as_str().to_owned()))
                })
                .collect(),
        )
    }
}

/// A pattern and what to show when it matches.
#[derive(Debug, Clone)]
pub struct Route<V> {
    /// `None` never matches, only a fallback can show it.
    pub pattern: Option<Pattern>,
    pub view: V,
    /// Shown when no pattern matches.
    pub default: bool,
}

impl<V> Route<V> {
    pub fn new(path: &str, view: V) -> Result<Self, regex_lite::Error> {
        Ok(Self {
            pattern: Some(Pattern::new(path)?),
            view,
            default: false,
        })
    }

    /// Route without a path, shown when nothing else matches.
    pub fn otherwise(view: V) -> Self {
        Self {
            pattern: None,
            view,
            default: true,
        }
    }

    /// Mark this route as the fallback.
    pub fn fallback(mut self) -> Self {
        self.default = true;
        self
    }
}

/// Route chosen for a location.
#[derive(Debug, PartialEq)]
pub struct Match<'a, V> {
    pub view: &'a V,
    pub params: Params,
}

/// Resolve `location` against `routes`, in order.
///
/// Only the path is matched, any `?query` or `#fragment` is ignored.
/// The first matching route wins. Without one, the last route flagged
/// default seen is used with no parameters.
pub fn match_route<'a, V>(
    routes: &'a [Route<V>],
    location: &str,
) -> Option<Match<'a, V>> {
    let path = location.split(['?', '#']).next().unwrap_or_default();
    let mut fallback = None;

    for route in routes {
        if route.default {
            fallback = Some(route);
        }
        if let Some(params) =
            route.pattern.as_ref().and_then(|pattern| pattern.matches(path))
        {
            return Some(Match {
                view: &route.view,
                params,
            });
        }
    }

    fallback.map(|route| Match {
        view: &route.view,
        params: Params::new(),
    })
}

type Subscriber<V> = Box<dyn FnMut(&str, Option<&Match<'_, V>>) + Send>;

/// Client-side navigation over a history stack.
pub struct Navigator<V> {
    routes: Vec<Route<V>>,
    history: Vec<String>,
    cursor: usize,
    subscribers: Vec<Subscriber<V>>,
}

impl<V> Navigator<V> {
    /// Create a new [`Navigator`] positioned on `location`.
    pub fn new(routes: Vec<Route<V>>, location: &str) -> Self {
        Self {
            routes,
            history: vec![location.to_owned()],
            cursor: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn location(&self) -> &str {
        &self.history[self.cursor]
    }

    /// Route resolved for the current location.
    pub fn current(&self) -> Option<Match<'_, V>> {
        match_route(&self.routes, self.location())
    }

    /// Be called after every location change.
    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: FnMut(&str, Option<&Match<'_, V>>) + Send + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Push `location`, dropping any forward entries.
    pub fn navigate(&mut self, location: &str) {
        self.history.truncate(self.cursor + 1);
        self.history.push(location.to_owned());
        self.cursor += 1;
        self.notify();
    }

    /// Go one entry back. Returns `false` at the start of history.
    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }

        self.cursor -= 1;
        self.notify();
        true
    }

    /// Go one entry forward. Returns `false` at the end of history.
    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.history.len() {
            return false;
        }

        self.cursor += 1;
        self.notify();
        true
    }

    fn notify(&mut self) {
        let location = &self.history[self.cursor];
        let resolved = match_route(&self.routes, location);

        for subscriber in &mut self.subscribers {
            subscriber(location, resolved.as_ref());
        }
    }
}
