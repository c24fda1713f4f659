//! Plain-text rendering of screens for the terminal.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::fmt::Write as _;

use coursehub::catalog::{self, CourseAccess, LessonNeighbors, PageWindow};
use coursehub::net::types::{Course, CoursePage, EnrolledCourse, Identity, Lesson, LessonSummary};

pub fn identity(identity: &Identity) -> String {
    let mut out = format!("{} (#{}, {})", identity.name, identity.id, identity.role);
    if let Some(username) = &identity.username {
        let _ = write!(out, "\n  username: {username}");
    }
    if let Some(email) = &identity.email {
        let _ = write!(out, "\n  email:    {email}");
    }
    out
}

/// One-line catalog entry; `favorite` marks liked courses with `*`.
pub fn course_line(course: &Course, favorite: bool) -> String {
    let mark = if favorite { "*" } else { " " };
    format!(
        "{mark} #{:<4} {}  [{}]  by {}  ({} enrolled)",
        course.id, course.title, course.category.name, course.instructor_username, course.enrollment_count
    )
}

pub fn course_list(courses: &[Course], is_favorite: impl Fn(&Course) -> bool) -> String {
    if courses.is_empty() {
        return "No courses.".to_owned();
    }
    courses.iter().map(|course| course_line(course, is_favorite(course))).collect::<Vec<_>>().join("\n")
}

pub fn course_page(page: &CoursePage, is_favorite: impl Fn(&Course) -> bool) -> String {
    let mut out = course_list(&page.results, is_favorite);
    let _ = write!(out, "\n\n{} courses", page.total_items);
    if let Some(window) = PageWindow::new(page.current_page, page.total_pages) {
        let _ = write!(out, "  pages: {}", window.render());
    }
    out
}

fn lesson_lines(lessons: &[LessonSummary]) -> String {
    catalog::sorted_lessons(lessons)
        .iter()
        .map(|lesson| format!("  {}. {} (lesson #{})", lesson.order, lesson.title, lesson.id))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn course_detail(course: &Course, access: CourseAccess, favorite: bool) -> String {
    let mut out = format!("{}{}\n", course.title, if favorite { "  *favorite*" } else { "" });
    let _ = writeln!(out, "{} · by {} · {} enrolled", course.category.name, course.instructor_username, course.enrollment_count);
    let _ = writeln!(out, "\n{}\n", course.description);
    if course.lessons.is_empty() {
        out.push_str("No lessons yet.\n");
    } else {
        let _ = writeln!(out, "Lessons:\n{}", lesson_lines(&course.lessons));
    }
    out.push('\n');
    out.push_str(match access {
        CourseAccess::Anonymous => "Log in to enroll.",
        CourseAccess::Owner => "You teach this course: `coursehub instructor lesson list`.",
        CourseAccess::Enrolled => "Enrolled: `coursehub learn <course> <lesson>` to continue.",
        CourseAccess::NotEnrolled => "Not enrolled: `coursehub enroll <course>`.",
    });
    out
}

pub fn enrollments(rows: &[EnrolledCourse]) -> String {
    if rows.is_empty() {
        return "You are not enrolled in any course.".to_owned();
    }
    rows.iter()
        .map(|row| format!("#{:<4} {}  (since {})", row.course.id, row.course.title, row.enrolled_at))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn lesson(course: &Course, lesson: &Lesson, neighbors: &LessonNeighbors, progress: u8) -> String {
    let mut out = format!("{} › {}. {}  [{progress}%]\n", course.title, lesson.order, lesson.title);
    if let Some(video) = &lesson.video_url {
        let _ = writeln!(out, "video: {video}");
    }
    let _ = writeln!(out, "\n{}\n", lesson.content.as_deref().unwrap_or("(no content)"));
    let link = |summary: Option<&LessonSummary>| {
        summary.map_or_else(|| "-".to_owned(), |s| format!("{} (#{})", s.title, s.id))
    };
    let _ = write!(out, "prev: {}   next: {}", link(neighbors.previous.as_ref()), link(neighbors.next.as_ref()));
    out
}

pub fn lessons(course: &Course) -> String {
    if course.lessons.is_empty() {
        return format!("{}: no lessons yet.", course.title);
    }
    format!("{}:\n{}", course.title, lesson_lines(&course.lessons))
}
