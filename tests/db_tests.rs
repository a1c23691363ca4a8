// tests/db_tests.rs

mod common;

use std::collections::HashMap;

use chrono::Utc;
use common::{insert_user, memory_pool, test_config};
use quizdesk::{
    db::{
        questions::{self, NewQuestion, QuestionChanges},
        quizzes, results,
        users::{self, UserChanges},
    },
    error::AppError,
    models::user::Role,
    scoring::grading,
    seed,
};

fn new_question(text: &str, correct: &str) -> NewQuestion {
    NewQuestion {
        text: text.to_string(),
        choice_a: "one".to_string(),
        choice_b: "two".to_string(),
        choice_c: "three".to_string(),
        choice_d: "four".to_string(),
        correct: correct.to_string(),
    }
}

#[tokio::test]
async fn duplicate_quiz_title_is_refused() {
    let pool = memory_pool().await;

    let first = quizzes::add_quiz(&pool, "X", "first").await.unwrap();
    let second = quizzes::add_quiz(&pool, "X", "second").await.unwrap();

    assert!(first.is_some());
    assert!(second.is_none());

    let all = quizzes::list_quizzes(&pool).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].description, "first");
}

#[tokio::test]
async fn add_question_uppercases_and_requires_quiz() {
    let pool = memory_pool().await;
    let quiz = quizzes::add_quiz(&pool, "Letters", "").await.unwrap().unwrap();

    let added = questions::add_question(&pool, quiz.id, &new_question("Pick c", " c "))
        .await
        .unwrap()
        .expect("quiz exists");
    assert_eq!(added.correct, "C");
    assert_eq!(added.quiz_id, quiz.id);

    let orphan = questions::add_question(&pool, quiz.id + 100, &new_question("Lost", "a"))
        .await
        .unwrap();
    assert!(orphan.is_none());
    assert_eq!(questions::count_questions(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn questions_keep_insertion_order() {
    let pool = memory_pool().await;
    let quiz = quizzes::add_quiz(&pool, "Ordered", "").await.unwrap().unwrap();

    for text in ["first", "second", "third"] {
        questions::add_question(&pool, quiz.id, &new_question(text, "A"))
            .await
            .unwrap();
    }

    let texts: Vec<String> = questions::questions_for_quiz(&pool, quiz.id)
        .await
        .unwrap()
        .into_iter()
        .map(|q| q.text)
        .collect();
    assert_eq!(texts, ["first", "second", "third"]);
}

#[tokio::test]
async fn partial_updates_leave_other_fields() {
    let pool = memory_pool().await;
    let quiz = quizzes::add_quiz(&pool, "Before", "Old description").await.unwrap().unwrap();

    let updated = quizzes::update_quiz(&pool, quiz.id, None, Some("New description".to_string()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "Before");
    assert_eq!(updated.description, "New description");

    let question = questions::add_question(&pool, quiz.id, &new_question("Text", "A"))
        .await
        .unwrap()
        .unwrap();
    let changes = QuestionChanges {
        choice_b: Some("deux".to_string()),
        correct: Some("b".to_string()),
        ..QuestionChanges::default()
    };
    let question = questions::update_question(&pool, question.id, changes)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(question.text, "Text");
    assert_eq!(question.choice_a, "one");
    assert_eq!(question.choice_b, "deux");
    assert_eq!(question.correct, "B");

    let missing = quizzes::update_quiz(&pool, 999, Some("Nope".to_string()), None)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn delete_quiz_cascades_questions_and_results() {
    let pool = memory_pool().await;
    let student = insert_user(&pool, "cascade_student", "pw", Role::Student).await;
    let quiz = quizzes::add_quiz(&pool, "Doomed", "").await.unwrap().unwrap();
    let keeper = quizzes::add_quiz(&pool, "Keeper", "").await.unwrap().unwrap();

    for i in 0..3 {
        questions::add_question(&pool, quiz.id, &new_question(&format!("Q{}", i), "A"))
            .await
            .unwrap();
    }
    questions::add_question(&pool, keeper.id, &new_question("Stays", "A"))
        .await
        .unwrap();
    for score in 0..2 {
        results::record_result(&pool, student.id, quiz.id, score, 3, Utc::now())
            .await
            .unwrap();
    }
    results::record_result(&pool, student.id, keeper.id, 1, 1, Utc::now())
        .await
        .unwrap();

    assert!(quizzes::delete_quiz(&pool, quiz.id).await.unwrap());

    assert!(quizzes::find_quiz(&pool, quiz.id).await.unwrap().is_none());
    assert!(questions::questions_for_quiz(&pool, quiz.id).await.unwrap().is_empty());
    assert!(results::results_for_quiz(&pool, quiz.id).await.unwrap().is_empty());

    assert_eq!(questions::questions_for_quiz(&pool, keeper.id).await.unwrap().len(), 1);
    assert_eq!(results::results_for_quiz(&pool, keeper.id).await.unwrap().len(), 1);

    assert!(!quizzes::delete_quiz(&pool, quiz.id).await.unwrap());
}

#[tokio::test]
async fn grade_submission_appends_results() {
    let pool = memory_pool().await;
    let student = insert_user(&pool, "grader", "pw", Role::Student).await;
    let quiz = quizzes::add_quiz(&pool, "Graded", "").await.unwrap().unwrap();
    let q1 = questions::add_question(&pool, quiz.id, &new_question("One", "A"))
        .await
        .unwrap()
        .unwrap();
    let q2 = questions::add_question(&pool, quiz.id, &new_question("Two", "D"))
        .await
        .unwrap()
        .unwrap();

    let mut answers = HashMap::new();
    answers.insert(q1.id, Some(" a ".to_string()));

    let first = grading::grade_submission(&pool, student.id, quiz.id, &answers)
        .await
        .unwrap();
    assert_eq!((first.score, first.total), (1, 2));
    assert_eq!(first.percentage, 50.0);

    answers.insert(q2.id, Some("d".to_string()));
    let second = grading::grade_submission(&pool, student.id, quiz.id, &answers)
        .await
        .unwrap();
    assert_eq!((second.score, second.total), (2, 2));
    assert_ne!(first.result.id, second.result.id);

    let stored = results::results_for_student(&pool, student.id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].score, 1);
    assert_eq!(stored[1].score, 2);
    assert!(stored.iter().all(|r| r.score >= 0 && r.score <= r.total));

    let missing_quiz = grading::grade_submission(&pool, student.id, 999, &answers).await;
    assert!(matches!(missing_quiz, Err(AppError::NotFound(_))));

    let missing_student = grading::grade_submission(&pool, 999, quiz.id, &answers).await;
    assert!(matches!(missing_student, Err(AppError::NotFound(_))));
    assert_eq!(results::list_results(&pool).await.unwrap().len(), 2);
}

#[tokio::test]
async fn empty_quiz_submission_records_zero_of_zero() {
    let pool = memory_pool().await;
    let student = insert_user(&pool, "empty_taker", "pw", Role::Student).await;
    let quiz = quizzes::add_quiz(&pool, "Empty", "").await.unwrap().unwrap();

    let outcome = grading::grade_submission(&pool, student.id, quiz.id, &HashMap::new())
        .await
        .unwrap();

    assert_eq!((outcome.score, outcome.total), (0, 0));
    assert_eq!(outcome.percentage, 0.0);
    assert!(outcome.review.is_empty());
}

#[tokio::test]
async fn result_views_carry_titles() {
    let pool = memory_pool().await;
    let student = insert_user(&pool, "viewer", "pw", Role::Student).await;
    let quiz = quizzes::add_quiz(&pool, "Viewed", "").await.unwrap().unwrap();
    results::record_result(&pool, student.id, quiz.id, 1, 2, Utc::now())
        .await
        .unwrap();

    let views = results::result_views_for_student(&pool, student.id).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].quiz_title, "Viewed");
    assert_eq!(views[0].student_username, "viewer");

    assert_eq!(results::all_result_views(&pool).await.unwrap().len(), 1);
}

#[tokio::test]
async fn create_user_refuses_taken_username() {
    let pool = memory_pool().await;
    insert_user(&pool, "alice", "pw", Role::Student).await;

    let again = users::create_user(&pool, "alice", "hash", Role::Admin).await.unwrap();
    assert!(again.is_none());
    assert_eq!(users::count_users(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn update_user_changes_role_and_activation() {
    let pool = memory_pool().await;
    let user = insert_user(&pool, "bob", "pw", Role::Student).await;
    assert!(user.is_active);

    let changes = UserChanges {
        role: Some(Role::Admin),
        is_active: Some(false),
        ..UserChanges::default()
    };
    let updated = users::update_user(&pool, user.id, changes).await.unwrap().unwrap();

    assert_eq!(updated.username, "bob");
    assert_eq!(updated.role, Role::Admin);
    assert!(!updated.is_active);
    assert_eq!(users::count_active_users(&pool).await.unwrap(), 0);
    assert_eq!(users::count_by_role(&pool, Role::Admin).await.unwrap(), 1);
}

#[tokio::test]
async fn deleting_a_user_removes_their_results() {
    let pool = memory_pool().await;
    let user = insert_user(&pool, "leaver", "pw", Role::Student).await;
    let quiz = quizzes::add_quiz(&pool, "Left behind", "").await.unwrap().unwrap();
    results::record_result(&pool, user.id, quiz.id, 0, 1, Utc::now())
        .await
        .unwrap();

    assert!(users::delete_user(&pool, user.id).await.unwrap());
    assert!(results::list_results(&pool).await.unwrap().is_empty());
    assert!(!users::delete_user(&pool, user.id).await.unwrap());
}

#[tokio::test]
async fn import_quiz_is_atomic_on_duplicate_title() {
    let pool = memory_pool().await;
    quizzes::add_quiz(&pool, "Imported", "").await.unwrap();

    let batch = vec![new_question("One", "a"), new_question("Two", "b")];
    let duplicate = quizzes::import_quiz(&pool, "Imported", "", &batch).await.unwrap();
    assert!(duplicate.is_none());
    assert_eq!(questions::count_questions(&pool).await.unwrap(), 0);

    let detail = quizzes::import_quiz(&pool, "Fresh import", "desc", &batch)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.questions.len(), 2);
    assert_eq!(detail.questions[1].correct, "B");
}

#[tokio::test]
async fn seeding_is_idempotent() {
    let pool = memory_pool().await;
    let mut config = test_config();
    config.admin_username = Some("root".to_string());
    config.admin_password = Some("secret".to_string());

    assert!(seed::seed_admin_user(&pool, &config).await.unwrap());
    assert!(!seed::seed_admin_user(&pool, &config).await.unwrap());

    assert!(seed::seed_sample_quiz(&pool).await.unwrap());
    assert!(!seed::seed_sample_quiz(&pool).await.unwrap());

    let admin = users::find_by_username(&pool, "root").await.unwrap().unwrap();
    assert_eq!(admin.role, Role::Admin);

    let sample = quizzes::find_by_title(&pool, seed::SAMPLE_QUIZ_TITLE)
        .await
        .unwrap()
        .unwrap();
    let sample_questions = questions::questions_for_quiz(&pool, sample.id).await.unwrap();
    assert_eq!(sample_questions.len(), 1);
    assert_eq!(sample_questions[0].correct, "B");
}
