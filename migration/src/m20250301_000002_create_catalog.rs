use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000001_create_accounts::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Genre::Table)
                    .if_not_exists()
                    .col(pk_auto(Genre::Id))
                    .col(text(Genre::Name))
                    .col(integer_null(Genre::AddedBy))
                    .foreign_key(&mut added_by_fk("fk_genre_added_by", Genre::Table, Genre::AddedBy))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().name("idx_genre_name").table(Genre::Table).col(Genre::Name).to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Person::Table)
                    .if_not_exists()
                    .col(pk_auto(Person::Id))
                    .col(string(Person::FullName))
                    .col(text(Person::Intro))
                    .col(string(Person::Image).default("default person.jpg"))
                    .col(string_null(Person::DateOfBirth))
                    .col(string_uniq(Person::Slug))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_person_full_name")
                    .table(Person::Table)
                    .col(Person::FullName)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(pk_auto(Movie::Id))
                    .col(text(Movie::Title))
                    .col(string(Movie::Poster).default("default poster.jpg"))
                    .col(string(Movie::ReleaseDate))
                    .col(string(Movie::OfficialTrailer))
                    .col(text(Movie::CountryOfOrigin))
                    .col(integer_null(Movie::GenreId))
                    .col(string(Movie::Duration))
                    .col(text(Movie::Awards))
                    .col(string_uniq(Movie::Slug))
                    .col(big_integer(Movie::NumOfRating).default(0))
                    .col(big_integer(Movie::TotalRating).default(0))
                    .col(big_integer(Movie::NumOfReviews).default(0))
                    .col(big_integer(Movie::AverageRating).default(0))
                    .col(integer_null(Movie::AddedBy))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_genre_id")
                            .from(Movie::Table, Movie::GenreId)
                            .to(Genre::Table, Genre::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(&mut added_by_fk("fk_movie_added_by", Movie::Table, Movie::AddedBy))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_release_date")
                    .table(Movie::Table)
                    .col(Movie::ReleaseDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().name("idx_movie_title").table(Movie::Table).col(Movie::Title).to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Cast::Table)
                    .if_not_exists()
                    .col(pk_auto(Cast::Id))
                    .col(integer(Cast::MovieId))
                    .col(integer(Cast::PersonId))
                    .col(string_null(Cast::Character))
                    .col(boolean(Cast::Star).default(false))
                    .col(integer_null(Cast::AddedBy))
                    .foreign_key(&mut movie_fk("fk_cast_movie_id", Cast::Table, Cast::MovieId))
                    .foreign_key(&mut person_fk("fk_cast_person_id", Cast::Table, Cast::PersonId))
                    .foreign_key(&mut added_by_fk("fk_cast_added_by", Cast::Table, Cast::AddedBy))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Director::Table)
                    .if_not_exists()
                    .col(pk_auto(Director::Id))
                    .col(integer(Director::MovieId))
                    .col(integer(Director::PersonId))
                    .col(integer_null(Director::AddedBy))
                    .foreign_key(&mut movie_fk("fk_director_movie_id", Director::Table, Director::MovieId))
                    .foreign_key(&mut person_fk(
                        "fk_director_person_id",
                        Director::Table,
                        Director::PersonId,
                    ))
                    .foreign_key(&mut added_by_fk(
                        "fk_director_added_by",
                        Director::Table,
                        Director::AddedBy,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Producer::Table)
                    .if_not_exists()
                    .col(pk_auto(Producer::Id))
                    .col(integer(Producer::MovieId))
                    .col(integer(Producer::PersonId))
                    .col(integer_null(Producer::AddedBy))
                    .foreign_key(&mut movie_fk("fk_producer_movie_id", Producer::Table, Producer::MovieId))
                    .foreign_key(&mut person_fk(
                        "fk_producer_person_id",
                        Producer::Table,
                        Producer::PersonId,
                    ))
                    .foreign_key(&mut added_by_fk(
                        "fk_producer_added_by",
                        Producer::Table,
                        Producer::AddedBy,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Crew::Table)
                    .if_not_exists()
                    .col(pk_auto(Crew::Id))
                    .col(integer(Crew::MovieId))
                    .col(string(Crew::Name))
                    .col(string(Crew::Role))
                    .foreign_key(&mut movie_fk("fk_crew_movie_id", Crew::Table, Crew::MovieId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rating::Table)
                    .if_not_exists()
                    .col(pk_auto(Rating::Id))
                    .col(integer(Rating::UserId))
                    .col(integer(Rating::MovieId))
                    .col(big_integer(Rating::Rating))
                    .foreign_key(&mut user_fk("fk_rating_user_id", Rating::Table, Rating::UserId))
                    .foreign_key(&mut movie_fk("fk_rating_movie_id", Rating::Table, Rating::MovieId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rating_user_movie")
                    .table(Rating::Table)
                    .col(Rating::UserId)
                    .col(Rating::MovieId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(pk_auto(Review::Id))
                    .col(integer(Review::MovieId))
                    .col(integer(Review::UserId))
                    .col(text(Review::Review))
                    .col(big_integer(Review::CreatedAt))
                    .col(string_uniq(Review::Slug))
                    .foreign_key(&mut movie_fk("fk_review_movie_id", Review::Table, Review::MovieId))
                    .foreign_key(&mut user_fk("fk_review_user_id", Review::Table, Review::UserId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_review_user_movie")
                    .table(Review::Table)
                    .col(Review::UserId)
                    .col(Review::MovieId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_review_movie_id")
                    .table(Review::Table)
                    .col(Review::MovieId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Review::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Rating::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Crew::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Producer::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Director::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Cast::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Person::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Genre::Table).to_owned()).await?;
        Ok(())
    }
}

fn added_by_fk<T: IntoTableRef, C: IntoIden>(
    name: &str,
    table: T,
    col: C,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, col)
        .to(User::Table, User::Id)
        .on_delete(ForeignKeyAction::SetNull)
        .to_owned()
}

fn user_fk<T: IntoTableRef, C: IntoIden>(
    name: &str,
    table: T,
    col: C,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, col)
        .to(User::Table, User::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

fn movie_fk<T: IntoTableRef, C: IntoIden>(
    name: &str,
    table: T,
    col: C,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, col)
        .to(Movie::Table, Movie::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

fn person_fk<T: IntoTableRef, C: IntoIden>(
    name: &str,
    table: T,
    col: C,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, col)
        .to(Person::Table, Person::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

#[derive(DeriveIden)]
enum Genre {
    Table,
    Id,
    Name,
    AddedBy,
}

#[derive(DeriveIden)]
enum Person {
    Table,
    Id,
    FullName,
    Intro,
    Image,
    DateOfBirth,
    Slug,
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    Title,
    Poster,
    ReleaseDate,
    OfficialTrailer,
    CountryOfOrigin,
    GenreId,
    Duration,
    Awards,
    Slug,
    NumOfRating,
    TotalRating,
    NumOfReviews,
    AverageRating,
    AddedBy,
}

#[derive(DeriveIden)]
enum Cast {
    Table,
    Id,
    MovieId,
    PersonId,
    Character,
    Star,
    AddedBy,
}

#[derive(DeriveIden)]
enum Director {
    Table,
    Id,
    MovieId,
    PersonId,
    AddedBy,
}

#[derive(DeriveIden)]
enum Producer {
    Table,
    Id,
    MovieId,
    PersonId,
    AddedBy,
}

#[derive(DeriveIden)]
enum Crew {
    Table,
    Id,
    MovieId,
    Name,
    Role,
}

#[derive(DeriveIden)]
enum Rating {
    Table,
    Id,
    UserId,
    MovieId,
    Rating,
}

#[derive(DeriveIden)]
enum Review {
    Table,
    Id,
    MovieId,
    UserId,
    Review,
    CreatedAt,
    Slug,
}
