//! Store tests against a real Postgres. They run when `DATABASE_URL` is set
//! (directly or via `.env`) and are skipped otherwise.

mod common;

use std::env;

use chrono::Duration;
use quizbit_backend::{
    database::{
        pool::{create_pool, run_migrations},
        postgres::PgStore,
        store::{QuestionStore, SubmissionStore, UserStore},
    },
    error::Error,
    models::{
        question::{Difficulty, QuestionFilter},
        submission::NewSubmission,
        user::{AccountStatus, NewUser, OtpChallenge, User},
    },
    utils::time::now,
};
use sqlx::PgPool;
use uuid::Uuid;

async fn setup() -> Option<(PgStore, PgPool)> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres store test");
        return None;
    };
    let mut config = common::test_config();
    config.database_url = database_url;
    config.database_max_connections = 2;
    let pool = create_pool(&config).await.expect("pool");
    run_migrations(&pool).await.expect("migrations");
    Some((PgStore::new(pool.clone()), pool))
}

fn unique_email() -> String {
    format!("pg_{}@example.com", Uuid::new_v4())
}

async fn new_user(store: &PgStore) -> User {
    store
        .create(NewUser {
            email: unique_email(),
            name: Some("Pg User".into()),
            password_hash: "$argon2id$stub".into(),
        })
        .await
        .expect("create user")
}

fn challenge(code: i32) -> OtpChallenge {
    OtpChallenge {
        code,
        issued_at: now(),
    }
}

async fn seed_category(pool: &PgPool) -> i64 {
    sqlx::query_scalar("INSERT INTO question_categories (name) VALUES ($1) RETURNING id")
        .bind(format!("category-{}", Uuid::new_v4()))
        .fetch_one(pool)
        .await
        .expect("seed category")
}

/// Returns the question id and its answer ids in insertion order.
async fn seed_question(
    pool: &PgPool,
    category_id: i64,
    difficulty: Difficulty,
    is_active: bool,
    options: &[(&str, bool)],
) -> (i64, Vec<i64>) {
    let question_id: i64 = sqlx::query_scalar(
        r#"INSERT INTO questions (text, difficulty, category_id, is_active)
           VALUES ($1, $2, $3, $4) RETURNING id"#,
    )
    .bind(format!("question {}", Uuid::new_v4()))
    .bind(difficulty.as_str())
    .bind(category_id)
    .bind(is_active)
    .fetch_one(pool)
    .await
    .expect("seed question");

    let mut answer_ids = Vec::new();
    for (text, is_correct) in options {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO answers (question_id, text, is_correct) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(question_id)
        .bind(*text)
        .bind(*is_correct)
        .fetch_one(pool)
        .await
        .expect("seed answer");
        answer_ids.push(id);
    }
    (question_id, answer_ids)
}

#[tokio::test]
async fn duplicate_email_insert_is_a_conflict() {
    let Some((store, _pool)) = setup().await else {
        return;
    };
    let user = new_user(&store).await;
    assert_eq!(user.status, AccountStatus::Unverified);

    let err = store
        .create(NewUser {
            email: user.email.clone(),
            name: None,
            password_hash: "$argon2id$other".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)), "{err:?}");
}

#[tokio::test]
async fn storing_a_code_moves_only_unverified_accounts_to_pending() {
    let Some((store, pool)) = setup().await else {
        return;
    };
    let user = new_user(&store).await;

    let pending = store.store_otp(&user.email, challenge(4321)).await.unwrap();
    assert_eq!(pending.status, AccountStatus::Pending);
    assert_eq!(pending.otp.map(|c| c.code), Some(4321));

    sqlx::query("UPDATE users SET status = 'active' WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();
    let still_active = store.store_otp(&user.email, challenge(1234)).await.unwrap();
    assert_eq!(still_active.status, AccountStatus::Active);

    let err = store
        .store_otp(&unique_email(), challenge(1111))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn activation_is_conditional_and_cannot_be_replayed() {
    let Some((store, _pool)) = setup().await else {
        return;
    };
    let user = new_user(&store).await;

    // Unverified rows hold no code yet.
    assert!(!store.activate(user.id, 5555).await.unwrap());

    store.store_otp(&user.email, challenge(5555)).await.unwrap();
    assert!(!store.activate(user.id, 5556).await.unwrap());
    let unchanged = store.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, AccountStatus::Pending);

    assert!(store.activate(user.id, 5555).await.unwrap());
    assert!(!store.activate(user.id, 5555).await.unwrap());

    let active = store.find_by_email(&user.email).await.unwrap().unwrap();
    assert_eq!(active.status, AccountStatus::Active);
    assert!(active.otp.is_none());
}

#[tokio::test]
async fn catalog_queries_filter_and_attach_answers_in_order() {
    let Some((store, pool)) = setup().await else {
        return;
    };
    let category_id = seed_category(&pool).await;
    let (hard, hard_answers) = seed_question(
        &pool,
        category_id,
        Difficulty::Hard,
        true,
        &[("first", false), ("second", true), ("third", false)],
    )
    .await;
    let (easy, _) =
        seed_question(&pool, category_id, Difficulty::Easy, true, &[("only", true)]).await;
    let (hidden, hidden_answers) =
        seed_question(&pool, category_id, Difficulty::Hard, false, &[("x", true)]).await;

    assert!(store.category_exists(category_id).await.unwrap());
    assert!(!store.category_exists(-1).await.unwrap());

    let all = store
        .list_active(QuestionFilter {
            difficulty: None,
            category_id: Some(category_id),
        })
        .await
        .unwrap();
    let ids: Vec<i64> = all.iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![hard, easy]);

    let hard_only = store
        .list_active(QuestionFilter {
            difficulty: Some(Difficulty::Hard),
            category_id: Some(category_id),
        })
        .await
        .unwrap();
    assert_eq!(hard_only.len(), 1);
    let answer_ids: Vec<i64> = hard_only[0].answers.iter().map(|a| a.id).collect();
    assert_eq!(answer_ids, hard_answers);
    assert_eq!(hard_only[0].category.id, category_id);

    assert!(store.find_active(hidden).await.unwrap().is_none());
    let answer = store.find_answer(hidden_answers[0]).await.unwrap().unwrap();
    assert_eq!(answer.question_id, hidden);
}

#[tokio::test]
async fn second_submission_for_a_question_is_a_conflict() {
    let Some((store, pool)) = setup().await else {
        return;
    };
    let user = new_user(&store).await;
    let category_id = seed_category(&pool).await;
    let (question, answers) = seed_question(
        &pool,
        category_id,
        Difficulty::Medium,
        true,
        &[("right", true), ("wrong", false)],
    )
    .await;

    let first = store
        .insert(NewSubmission {
            user_id: user.id,
            question_id: question,
            answer_id: answers[1],
            is_correct: false,
        })
        .await
        .unwrap();
    assert!(store.exists(user.id, question).await.unwrap());

    let err = store
        .insert(NewSubmission {
            user_id: user.id,
            question_id: question,
            answer_id: answers[0],
            is_correct: true,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)), "{err:?}");

    let history = store.history(user.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].answer_id, first.answer_id);
    assert!(!history[0].is_correct);
}

#[tokio::test]
async fn history_is_newest_first_with_question_and_answer_text() {
    let Some((store, pool)) = setup().await else {
        return;
    };
    let user = new_user(&store).await;
    let category_id = seed_category(&pool).await;
    let (older_q, older_a) =
        seed_question(&pool, category_id, Difficulty::Easy, true, &[("old", true)]).await;
    let (newer_q, newer_a) =
        seed_question(&pool, category_id, Difficulty::Hard, true, &[("new", false)]).await;

    for (question_id, answer_id, is_correct) in
        [(older_q, older_a[0], true), (newer_q, newer_a[0], false)]
    {
        store
            .insert(NewSubmission {
                user_id: user.id,
                question_id,
                answer_id,
                is_correct,
            })
            .await
            .unwrap();
    }
    sqlx::query("UPDATE submissions SET submitted_at = $3 WHERE user_id = $1 AND question_id = $2")
        .bind(user.id)
        .bind(older_q)
        .bind(now() - Duration::hours(1))
        .execute(&pool)
        .await
        .unwrap();

    let history = store.history(user.id).await.unwrap();
    let order: Vec<i64> = history.iter().map(|e| e.question_id).collect();
    assert_eq!(order, vec![newer_q, older_q]);
    assert_eq!(history[0].difficulty, "hard");
    assert_eq!(history[0].answer_text, "new");
    assert_eq!(history[1].answer_text, "old");
    assert!(history[1].is_correct);
}
