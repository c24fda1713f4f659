use coursehub::net::types::{Category, Role};

use super::*;

fn course() -> Course {
    Course {
        id: 4,
        title: "Rust Basics".into(),
        description: "Ownership and borrowing".into(),
        category_id: 1,
        instructor_id: 3,
        instructor_username: "carol".into(),
        category: Category { id: 1, name: "Programming".into() },
        lessons: vec![
            LessonSummary { id: 42, title: "Traits".into(), order: 2 },
            LessonSummary { id: 41, title: "Ownership".into(), order: 1 },
        ],
        enrollment_count: 12,
        thumbnail_url: None,
    }
}

#[test]
fn course_line_marks_favorites() {
    assert!(course_line(&course(), true).starts_with("* #4"));
    assert!(course_line(&course(), false).starts_with("  #4"));
}

#[test]
fn course_detail_lists_lessons_in_order_and_next_step() {
    let text = course_detail(&course(), CourseAccess::NotEnrolled, false);
    let first = text.find("1. Ownership").unwrap();
    let second = text.find("2. Traits").unwrap();
    assert!(first < second);
    assert!(text.ends_with("Not enrolled: `coursehub enroll <course>`."));
}

#[test]
fn lesson_view_shows_progress_and_neighbors() {
    let course = course();
    let lesson = Lesson { id: 41, title: "Ownership".into(), order: 1, video_url: None, content: Some("Moves.".into()) };
    let neighbors = catalog::lesson_neighbors(&course.lessons, 41);
    let text = super::lesson(&course, &lesson, &neighbors, 50);
    assert!(text.contains("[50%]"));
    assert!(text.ends_with("prev: -   next: Traits (#42)"));
}

#[test]
fn identity_includes_optional_fields() {
    let who = Identity {
        id: 1,
        name: "Alice".into(),
        role: Role::Student,
        username: Some("alice".into()),
        email: None,
    };
    assert_eq!(identity(&who), "Alice (#1, student)\n  username: alice");
}

#[test]
fn empty_lists_have_friendly_text() {
    assert_eq!(course_list(&[], |_| false), "No courses.");
    assert_eq!(enrollments(&[]), "You are not enrolled in any course.");
}
