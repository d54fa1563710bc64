//! Catalog service: genres, languages, authors, books and their copies

use chrono::{Local, NaiveDate};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDetails, AuthorForm},
        book::{display_genre, Book, BookDetails, BookForm, BookSearch, BookShort},
        book_instance::{BookInstance, BookInstanceShort, CreateBookInstance, UpdateBookInstance},
        genre::{Genre, Language, NameForm},
        stats::CatalogSummary,
    },
    repository::Repository,
};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Index page counts
    pub async fn summary(&self) -> AppResult<CatalogSummary> {
        self.repository.stats_summary().await
    }

    // Genres

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres_list().await
    }

    pub async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        self.repository.genres_get_by_id(id).await
    }

    pub async fn create_genre(&self, form: &NameForm) -> AppResult<Genre> {
        form.validate()?;
        let genre = self.repository.genres_create(form.normalized()).await?;
        tracing::info!(id = genre.id, name = %genre.name, "Genre created");
        Ok(genre)
    }

    pub async fn update_genre(&self, id: i32, form: &NameForm) -> AppResult<Genre> {
        form.validate()?;
        self.repository.genres_update(id, form.normalized()).await
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres_delete(id).await?;
        tracing::info!(id, "Genre deleted");
        Ok(())
    }

    // Languages

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.repository.languages_list().await
    }

    pub async fn get_language(&self, id: i32) -> AppResult<Language> {
        self.repository.languages_get_by_id(id).await
    }

    pub async fn create_language(&self, form: &NameForm) -> AppResult<Language> {
        form.validate()?;
        let language = self.repository.languages_create(form.normalized()).await?;
        tracing::info!(id = language.id, name = %language.name, "Language created");
        Ok(language)
    }

    pub async fn update_language(&self, id: i32, form: &NameForm) -> AppResult<Language> {
        form.validate()?;
        self.repository.languages_update(id, form.normalized()).await
    }

    pub async fn delete_language(&self, id: i32) -> AppResult<()> {
        self.repository.languages_delete(id).await?;
        tracing::info!(id, "Language deleted");
        Ok(())
    }

    // Authors

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors_list().await
    }

    /// Author with the books attributed to them
    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.repository.authors_get_by_id(id).await?;
        let books = self.repository.books_by_author(id).await?;
        Ok(AuthorDetails { author, books })
    }

    pub async fn create_author(&self, form: &AuthorForm) -> AppResult<Author> {
        form.validate()?;
        let author = self.repository.authors_create(form).await?;
        tracing::info!(id = author.id, name = %author.display_name(), "Author created");
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, form: &AuthorForm) -> AppResult<Author> {
        form.validate()?;
        self.repository.authors_update(id, form).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors_delete(id).await?;
        tracing::info!(id, "Author deleted");
        Ok(())
    }

    // Books

    pub async fn list_books(&self) -> AppResult<Vec<BookShort>> {
        self.repository.books_list().await
    }

    /// Books whose title matches `book_name` or whose author matches `author_name`
    pub async fn search_books(&self, search: &BookSearch) -> AppResult<Vec<BookShort>> {
        let books = self.repository.books_search(search).await?;
        tracing::debug!(
            book_name = ?search.book_name,
            author_name = ?search.author_name,
            results = books.len(),
            "Book search"
        );
        Ok(books)
    }

    /// Book with its author, language, genres and copies
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books_get_by_id(id).await?;

        let author = match book.author_id {
            Some(author_id) => Some(self.repository.authors_get_by_id(author_id).await?),
            None => None,
        };
        let language = match book.language_id {
            Some(language_id) => Some(self.repository.languages_get_by_id(language_id).await?),
            None => None,
        };
        let genres = self.repository.genres_for_book(id).await?;
        let instances = self.repository.instances_for_book(id).await?;

        Ok(BookDetails {
            id: book.id,
            title: book.title,
            summary: book.summary,
            isbn: book.isbn,
            author,
            language,
            display_genre: display_genre(&genres),
            genres,
            instances,
        })
    }

    pub async fn create_book(&self, form: &BookForm) -> AppResult<Book> {
        form.validate()?;
        let book = self.repository.books_create(form).await?;
        tracing::info!(id = book.id, title = %book.title, "Book created");
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, form: &BookForm) -> AppResult<Book> {
        form.validate()?;
        self.repository.books_update(id, form).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books_delete(id).await?;
        tracing::info!(id, "Book deleted");
        Ok(())
    }

    // Book instances

    pub async fn list_instances(&self) -> AppResult<Vec<BookInstanceShort>> {
        let today = today();
        let instances = self.repository.instances_list().await?;
        Ok(instances.into_iter().map(|i| i.with_overdue(today)).collect())
    }

    pub async fn get_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        self.repository.instances_get_by_id(id).await
    }

    pub async fn create_instance(&self, data: &CreateBookInstance) -> AppResult<BookInstance> {
        data.validate()?;
        let instance = self.repository.instances_create(data).await?;
        tracing::info!(id = %instance.id, book_id = ?instance.book_id, "Book instance created");
        Ok(instance)
    }

    pub async fn update_instance(&self, id: Uuid, data: &UpdateBookInstance) -> AppResult<BookInstance> {
        data.validate()?;
        self.repository.instances_update(id, data).await
    }

    pub async fn delete_instance(&self, id: Uuid) -> AppResult<()> {
        self.repository.instances_delete(id).await?;
        tracing::info!(%id, "Book instance deleted");
        Ok(())
    }
}
