//! Book search over an in-memory catalog
//!
//! The reference [`ServiceBoundary`]: it reads `term`, `format`, `page` and
//! `in_print`, plus an optional `publisher[...]` model built with
//! [`publisher_search_schema`].

use serde::Serialize;
use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    AccessError, AccessResultExt, ConfigurationError, Error, FieldSpec, FromModel, ModelSchema,
    RequestModel, Result, ServiceBoundary,
};

/// Results per page
pub const PAGE_SIZE: usize = 3;

/// Binding of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    Paper,
    Hard,
    Ebook,
}

impl Format {
    pub const ALL: [Self; 3] = [Self::Paper, Self::Hard, Self::Ebook];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Publisher {
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub format: Format,
    pub in_print: bool,
    pub publisher: Publisher,
}

/// Schema for the `publisher[...]` scope.
///
/// # Errors
///
/// Never fails for these declarations; the `Result` comes from the builders.
pub fn publisher_search_schema() -> std::result::Result<ModelSchema, ConfigurationError> {
    ModelSchema::new(
        "publisher_search",
        [
            FieldSpec::string("name").required().trim().build()?,
            FieldSpec::string("country").trim().blank_is_absent().build()?,
        ],
    )
}

/// Schema for book searches, with `publisher` nested.
///
/// # Errors
///
/// Never fails for these declarations; the `Result` comes from the builders.
pub fn book_search_schema() -> std::result::Result<ModelSchema, ConfigurationError> {
    let formats = Format::ALL.map(|format| -> &'static str { format.into() });
    ModelSchema::new(
        "book_search",
        [
            FieldSpec::string("term").blank_is_absent().trim().build()?,
            FieldSpec::enumeration("format", formats)
                .blank_is_absent()
                .build()?,
            FieldSpec::integer("page").default(1_i64).build()?,
            FieldSpec::boolean("in_print").build()?,
        ],
    )?
    .with_nested("publisher", publisher_search_schema()?)
}

/// Typed view of a `publisher[...]` model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherFilter {
    pub name: String,
    pub country: Option<String>,
}

impl FromModel for PublisherFilter {
    fn from_model(model: &RequestModel) -> std::result::Result<Self, AccessError> {
        Ok(Self {
            name: model.string("name")?.to_string(),
            country: model.string("country").optional()?.map(str::to_string),
        })
    }
}

/// Typed view of a `book_search` model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSearchRequest {
    pub term: Option<String>,
    pub format: Option<Format>,
    pub page: i64,
    pub in_print: Option<bool>,
    pub publisher: Option<PublisherFilter>,
}

impl FromModel for BookSearchRequest {
    fn from_model(model: &RequestModel) -> std::result::Result<Self, AccessError> {
        let format = model
            .enumeration("format")
            .optional()?
            .map(|text| {
                text.parse::<Format>().map_err(|_| AccessError::KindMismatch {
                    field: "format".to_string(),
                    expected: "enum",
                    found: "string",
                })
            })
            .transpose()?;

        Ok(Self {
            term: model.string("term").optional()?.map(str::to_string),
            format,
            page: model.integer("page")?,
            in_print: model.boolean("in_print").optional()?,
            publisher: model
                .nested("publisher")
                .optional()?
                .map(PublisherFilter::from_model)
                .transpose()?,
        })
    }
}

impl BookSearchRequest {
    fn matches(&self, book: &Book) -> bool {
        let term_matches = self.term.as_deref().map_or(true, |term| {
            let term = term.to_lowercase();
            book.title.to_lowercase().contains(&term) || book.author.to_lowercase().contains(&term)
        });
        let publisher_matches = self.publisher.as_ref().map_or(true, |filter| {
            book.publisher.name.eq_ignore_ascii_case(&filter.name)
                && filter
                    .country
                    .as_deref()
                    .map_or(true, |country| book.publisher.country.eq_ignore_ascii_case(country))
        });

        term_matches
            && self.format.map_or(true, |format| book.format == format)
            && self.in_print.map_or(true, |in_print| book.in_print == in_print)
            && publisher_matches
    }
}

/// One page of matching books
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub page: i64,
    pub total: usize,
    pub books: Vec<Book>,
}

/// Search service over a fixed list of books
#[derive(Debug, Clone)]
pub struct BookSearch {
    schema: ModelSchema,
    books: Vec<Book>,
}

impl BookSearch {
    /// Service over the given books
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the search schema cannot be declared.
    pub fn new(books: Vec<Book>) -> std::result::Result<Self, ConfigurationError> {
        Ok(Self {
            schema: book_search_schema()?,
            books,
        })
    }

    /// Service over the built-in sample catalog
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the search schema cannot be declared.
    pub fn with_sample_catalog() -> std::result::Result<Self, ConfigurationError> {
        Self::new(sample_catalog())
    }

    /// Replace the schema, e.g. to apply a configured unpermitted policy
    #[must_use]
    pub fn with_schema(mut self, schema: ModelSchema) -> Self {
        self.schema = schema;
        self
    }
}

impl ServiceBoundary for BookSearch {
    type Output = SearchResults;

    fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    fn serve(&self, request: &RequestModel) -> Result<SearchResults> {
        let search = BookSearchRequest::from_model(request)?;
        if search.page < 1 {
            return Err(Error::service_error(format!(
                "page must be at least 1, got {}",
                search.page
            )));
        }

        let matching: Vec<&Book> = self.books.iter().filter(|book| search.matches(book)).collect();
        let skip = usize::try_from(search.page - 1)
            .ok()
            .and_then(|index| index.checked_mul(PAGE_SIZE))
            .unwrap_or(usize::MAX);

        Ok(SearchResults {
            page: search.page,
            total: matching.len(),
            books: matching
                .into_iter()
                .skip(skip)
                .take(PAGE_SIZE)
                .cloned()
                .collect(),
        })
    }
}

fn book(
    title: &str,
    author: &str,
    format: Format,
    in_print: bool,
    publisher: (&str, &str),
) -> Book {
    Book {
        title: title.to_string(),
        author: author.to_string(),
        format,
        in_print,
        publisher: Publisher {
            name: publisher.0.to_string(),
            country: publisher.1.to_string(),
        },
    }
}

/// Books served by the `search` command
pub fn sample_catalog() -> Vec<Book> {
    const PRAGMATIC: (&str, &str) = ("Pragmatic", "US");
    const NO_STARCH: (&str, &str) = ("No Starch", "US");
    const MANNING: (&str, &str) = ("Manning", "US");
    const APRESS: (&str, &str) = ("Apress", "DE");

    vec![
        book("Programming Ruby", "Dave Thomas", Format::Paper, true, PRAGMATIC),
        book("Programming Ruby", "Dave Thomas", Format::Ebook, true, PRAGMATIC),
        book("Eloquent Ruby", "Russ Olsen", Format::Paper, false, MANNING),
        book("The Rust Programming Language", "Steve Klabnik", Format::Paper, true, NO_STARCH),
        book("The Rust Programming Language", "Steve Klabnik", Format::Ebook, true, NO_STARCH),
        book("Rust in Action", "Tim McNamara", Format::Paper, true, MANNING),
        book("Rust for Rustaceans", "Jon Gjengset", Format::Hard, true, NO_STARCH),
        book("Practical Rust Projects", "Shing Lyu", Format::Ebook, false, APRESS),
        book("Agile Web Development with Rails", "Sam Ruby", Format::Hard, false, PRAGMATIC),
    ]
}
