use crate::entities::{crew, genre, movie, person, review};

#[derive(Clone, Debug)]
pub struct CastMember {
    pub person: person::Model,
    pub character: Option<String>,
    pub star: bool,
}

#[derive(Clone, Debug)]
pub struct MovieDetail {
    pub movie: movie::Model,
    pub genre: Option<genre::Model>,
    pub directors: Vec<person::Model>,
    pub producers: Vec<person::Model>,
    pub cast: Vec<CastMember>,
    pub crew: Vec<crew::Model>,
}

#[derive(Clone, Debug)]
pub struct Role {
    pub movie: movie::Model,
    pub character: Option<String>,
}

#[derive(Clone, Debug)]
pub struct PersonDetail {
    pub person: person::Model,
    pub acted: Vec<Role>,
    pub directed: Vec<movie::Model>,
    pub produced: Vec<movie::Model>,
}

#[derive(Clone, Debug)]
pub struct GenreListing {
    pub genre: genre::Model,
    pub movies: Vec<movie::Model>,
}

#[derive(Clone, Debug, Default)]
pub struct SearchResults {
    pub movies: Vec<movie::Model>,
    pub people: Vec<person::Model>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.people.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct ReviewEntry {
    pub review: review::Model,
    pub author: String,
}

/// Choices offered by the staff dashboard forms.
#[derive(Clone, Debug, Default)]
pub struct CatalogIndex {
    pub genres: Vec<genre::Model>,
    pub people: Vec<person::Model>,
    pub movies: Vec<movie::Model>,
}
