//! Terminal front end for the course marketplace.
//!
//! Every subcommand is a screen: the session is initialized once, the route
//! guard decides whether the screen may render, and only then does the
//! command talk to the API. A denied screen prints where to go instead and
//! exits non-zero.

mod render;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use coursehub::catalog;
use coursehub::config::ClientConfig;
use coursehub::guard::GuardDecision;
use coursehub::net::types::{
    CategoryId, CourseDraft, CourseId, CourseUpdate, Identity, LessonDraft, LessonId, LessonUpdate, PasswordChange,
    ProfileUpdate, Registration,
};
use coursehub::routes::Route;
use coursehub::{App, ClientError};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("[{code}] {0}", code = .0.error_code())]
    Client(#[from] ClientError),
    #[error("{route} is not available; go to {redirect}")]
    Denied { route: Route, redirect: Route },
    #[error("session did not finish initializing")]
    NotReady,
    #[error("no category named `{0}`")]
    UnknownCategory(String),
    #[error("lesson {lesson_id} is not part of course {course_id}")]
    UnknownLesson { course_id: CourseId, lesson_id: LessonId },
    #[error("nothing to update; pass at least one field")]
    EmptyUpdate,
    #[error("output encode failed: {0}")]
    Output(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "coursehub", about = "Browse, learn, and teach on the course marketplace")]
struct Cli {
    /// API root; overrides `COURSEHUB_BASE_URL`.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Credential file; overrides `COURSEHUB_CREDENTIALS`.
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    /// Print raw JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        username: String,
        #[arg(long, env = "COURSEHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "COURSEHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the signed-in profile.
    Whoami,
    Profile(ProfileCommand),
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
    /// Featured courses.
    Home,
    Courses {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Course {
        course_id: CourseId,
    },
    Enroll {
        course_id: CourseId,
    },
    Unenroll {
        course_id: CourseId,
    },
    MyLearning,
    Favorites(FavoritesCommand),
    Learn {
        course_id: CourseId,
        lesson_id: LessonId,
    },
    BecomeInstructor,
    Instructor(InstructorCommand),
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Args, Debug)]
struct FavoritesCommand {
    #[command(subcommand)]
    command: FavoritesSubcommand,
}

#[derive(Subcommand, Debug)]
enum FavoritesSubcommand {
    List,
    Add { course_id: CourseId },
    Remove { course_id: CourseId },
}

#[derive(Args, Debug)]
struct InstructorCommand {
    #[command(subcommand)]
    command: InstructorSubcommand,
}

#[derive(Subcommand, Debug)]
enum InstructorSubcommand {
    Dashboard,
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category_id: CategoryId,
    },
    Edit {
        course_id: CourseId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category_id: Option<CategoryId>,
    },
    Delete {
        course_id: CourseId,
    },
    Lesson(LessonCommand),
}

#[derive(Args, Debug)]
struct LessonCommand {
    #[command(subcommand)]
    command: LessonSubcommand,
}

#[derive(Subcommand, Debug)]
enum LessonSubcommand {
    List {
        course_id: CourseId,
    },
    Add {
        course_id: CourseId,
        #[arg(long)]
        title: String,
        #[arg(long)]
        order: i32,
        #[arg(long)]
        video_url: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    Edit {
        course_id: CourseId,
        lesson_id: LessonId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        order: Option<i32>,
        #[arg(long)]
        video_url: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    Delete {
        course_id: CourseId,
        lesson_id: LessonId,
    },
}

impl Command {
    /// Screen this command renders on.
    fn route(&self) -> Route {
        match self {
            Self::Login { .. } => Route::Login,
            Self::Register { .. } => Route::Register,
            Self::Logout | Self::Home => Route::Home,
            Self::Whoami | Self::Profile(_) | Self::ChangePassword { .. } | Self::BecomeInstructor => Route::Profile,
            Self::Courses { .. } => Route::Courses,
            Self::Course { course_id } | Self::Enroll { course_id } => Route::CourseDetail(*course_id),
            Self::Unenroll { .. } | Self::MyLearning => Route::MyLearning,
            Self::Favorites(_) => Route::MyFavorites,
            Self::Learn { course_id, lesson_id } => Route::Learn { course_id: *course_id, lesson_id: *lesson_id },
            Self::Instructor(instructor) => match &instructor.command {
                InstructorSubcommand::Dashboard | InstructorSubcommand::Delete { .. } => Route::InstructorDashboard,
                InstructorSubcommand::Create { .. } => Route::CreateCourse,
                InstructorSubcommand::Edit { course_id, .. } => Route::EditCourse(*course_id),
                InstructorSubcommand::Lesson(lesson) => match &lesson.command {
                    LessonSubcommand::List { course_id }
                    | LessonSubcommand::Add { course_id, .. }
                    | LessonSubcommand::Edit { course_id, .. }
                    | LessonSubcommand::Delete { course_id, .. } => Route::ManageCourse(*course_id),
                },
            },
        }
    }
}

struct Screen<'a> {
    app: &'a App,
    json: bool,
}

impl Screen<'_> {
    fn show<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> Result<(), CliError> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text(value));
        }
        Ok(())
    }

    fn say(&self, message: &str) {
        if !self.json {
            println!("{message}");
        }
    }

    /// Identity for actions that need one even on an open screen.
    fn require_identity(&self, route: Route) -> Result<Identity, CliError> {
        self.app.session().identity().ok_or(CliError::Denied { route, redirect: Route::Login })
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(path) = cli.credentials {
        config = config.with_credentials_path(path);
    }

    let app = App::from_config(&config)?;
    let (session, _follower) = app.start().await;
    tracing::debug!(authenticated = session.is_authenticated(), "session ready");

    let route = cli.command.route();
    match app.navigate(route).await {
        GuardDecision::Allowed => {}
        GuardDecision::Denied { redirect } => return Err(CliError::Denied { route, redirect }),
        GuardDecision::Pending => return Err(CliError::NotReady),
    }

    let screen = Screen { app: &app, json: cli.json };
    run(&screen, cli.command).await
}

async fn run(screen: &Screen<'_>, command: Command) -> Result<(), CliError> {
    let app = screen.app;
    match command {
        Command::Login { username, password } => {
            let identity = app.session().login(&username, &password).await?;
            screen.show(&identity, |identity| format!("Logged in as {}", render::identity(identity)))
        }
        Command::Logout => {
            let next = app.session().logout()?;
            screen.say(&format!("Logged out. Next: {next}"));
            Ok(())
        }
        Command::Register { name, username, email, password } => {
            let identity = app.api().register(&Registration { name, username, email, password }).await?;
            screen.show(&identity, |identity| {
                format!("Registered {}\nLog in with `coursehub login`.", render::identity(identity))
            })
        }
        Command::Whoami => {
            let identity = app.session().refresh_identity().await?;
            screen.show(&identity, render::identity)
        }
        Command::Profile(profile) => run_profile(screen, profile).await,
        Command::ChangePassword { current, new } => {
            app.api().change_password(&PasswordChange { current_password: current, new_password: new }).await?;
            screen.say("Password changed.");
            Ok(())
        }
        Command::Home => {
            let courses = app.api().featured_courses().await?;
            screen.show(&courses, |courses| render::course_list(courses, |c| app.favorites().contains(c.id)))
        }
        Command::Courses { search, category, page } => run_courses(screen, search, category, page).await,
        Command::Course { course_id } => run_course(screen, course_id).await,
        Command::Enroll { course_id } => {
            screen.require_identity(Route::CourseDetail(course_id))?;
            app.api().enroll(course_id).await?;
            screen.say(&format!("Enrolled. Start with `coursehub course {course_id}`."));
            Ok(())
        }
        Command::Unenroll { course_id } => {
            app.api().unenroll(course_id).await?;
            screen.say("Enrollment cancelled.");
            Ok(())
        }
        Command::MyLearning => {
            let rows = app.api().my_enrollments().await?;
            screen.show(&rows, |rows| render::enrollments(rows))
        }
        Command::Favorites(favorites) => run_favorites(screen, favorites).await,
        Command::Learn { course_id, lesson_id } => run_learn(screen, course_id, lesson_id).await,
        Command::BecomeInstructor => {
            let identity = app.session().become_instructor().await?;
            screen.show(&identity, |identity| format!("You are now an instructor: {}", render::identity(identity)))
        }
        Command::Instructor(instructor) => run_instructor(screen, instructor).await,
    }
}

async fn run_profile(screen: &Screen<'_>, profile: ProfileCommand) -> Result<(), CliError> {
    let ProfileSubcommand::Update { name, username, email } = profile.command;
    let update = ProfileUpdate { name, email, username };
    if update.is_empty() {
        return Err(CliError::EmptyUpdate);
    }
    let updated = screen.app.api().update_profile(&update).await?;
    if let Err(e) = screen.app.session().refresh_identity().await {
        tracing::warn!(error = %e, "profile saved but identity refresh failed");
        screen.say("Profile saved; please log in again.");
    }
    screen.show(&updated, |identity| format!("Profile updated: {}", render::identity(identity)))
}

async fn run_courses(
    screen: &Screen<'_>,
    search: Option<String>,
    category: Option<String>,
    page: u32,
) -> Result<(), CliError> {
    let api = screen.app.api();
    let selected = match category {
        Some(name) => {
            let categories = api.categories().await?;
            let found = catalog::find_category(&categories, &name).cloned();
            Some(found.ok_or(CliError::UnknownCategory(name))?)
        }
        None => None,
    };
    let query = catalog::browse_query(page, search.as_deref(), selected.as_ref());
    let page = api.courses(&query).await?;
    screen.show(&page, |page| render::course_page(page, |c| screen.app.favorites().contains(c.id)))
}

async fn run_course(screen: &Screen<'_>, course_id: CourseId) -> Result<(), CliError> {
    let app = screen.app;
    let course = app.api().course(course_id).await?;
    let identity = app.session().identity();
    let enrollments = match &identity {
        Some(identity) if identity.id != course.instructor_id => app.api().my_enrollments().await?,
        _ => Vec::new(),
    };
    let access = catalog::course_access(identity.as_ref(), &course, &enrollments);
    let favorite = app.favorites().contains(course_id);
    screen.show(&course, |course| render::course_detail(course, access, favorite))
}

async fn run_favorites(screen: &Screen<'_>, favorites: FavoritesCommand) -> Result<(), CliError> {
    let app = screen.app;
    match favorites.command {
        FavoritesSubcommand::List => {
            let courses = app.api().favorite_courses().await?;
            screen.show(&courses, |courses| render::course_list(courses, |_| true))
        }
        FavoritesSubcommand::Add { course_id } => {
            app.favorites().add(course_id).await?;
            screen.say(&format!("Added course {course_id} to favorites ({} total).", app.favorites().len()));
            Ok(())
        }
        FavoritesSubcommand::Remove { course_id } => {
            app.favorites().remove(course_id).await?;
            screen.say(&format!("Removed course {course_id} from favorites ({} left).", app.favorites().len()));
            Ok(())
        }
    }
}

async fn run_learn(screen: &Screen<'_>, course_id: CourseId, lesson_id: LessonId) -> Result<(), CliError> {
    let api = screen.app.api();
    let course = api.course(course_id).await?;
    if !course.lessons.iter().any(|lesson| lesson.id == lesson_id) {
        return Err(CliError::UnknownLesson { course_id, lesson_id });
    }
    let lesson = api.lesson(lesson_id).await?;
    let neighbors = catalog::lesson_neighbors(&course.lessons, lesson_id);
    let progress = catalog::progress_percent(&course.lessons, lesson_id);
    screen.show(&lesson, |lesson| render::lesson(&course, lesson, &neighbors, progress))
}

async fn run_instructor(screen: &Screen<'_>, instructor: InstructorCommand) -> Result<(), CliError> {
    let api = screen.app.api();
    match instructor.command {
        InstructorSubcommand::Dashboard => {
            let courses = api.my_courses().await?;
            screen.show(&courses, |courses| render::course_list(courses, |_| false))
        }
        InstructorSubcommand::Create { title, description, category_id } => {
            let course = api.create_course(&CourseDraft { title, description, category_id }).await?;
            screen.show(&course, |course| format!("Created {}", render::course_line(course, false)))
        }
        InstructorSubcommand::Edit { course_id, title, description, category_id } => {
            let update = CourseUpdate { title, description, category_id };
            if update.title.is_none() && update.description.is_none() && update.category_id.is_none() {
                return Err(CliError::EmptyUpdate);
            }
            let course = api.update_course(course_id, &update).await?;
            screen.show(&course, |course| format!("Updated {}", render::course_line(course, false)))
        }
        InstructorSubcommand::Delete { course_id } => {
            api.delete_course(course_id).await?;
            screen.say(&format!("Deleted course {course_id}."));
            Ok(())
        }
        InstructorSubcommand::Lesson(lesson) => run_lesson(screen, lesson).await,
    }
}

async fn run_lesson(screen: &Screen<'_>, lesson: LessonCommand) -> Result<(), CliError> {
    let api = screen.app.api();
    match lesson.command {
        LessonSubcommand::List { course_id } => {
            let course = api.course(course_id).await?;
            screen.show(&course, render::lessons)
        }
        LessonSubcommand::Add { course_id, title, order, video_url, content } => {
            let draft = LessonDraft { title, order, video_url, content };
            let created = api.create_lesson(course_id, &draft).await?;
            screen.show(&created, |lesson| format!("Added lesson #{}: {}", lesson.id, lesson.title))
        }
        LessonSubcommand::Edit { lesson_id, title, order, video_url, content, .. } => {
            let update = LessonUpdate { title, order, video_url, content };
            if update.title.is_none() && update.order.is_none() && update.video_url.is_none() && update.content.is_none()
            {
                return Err(CliError::EmptyUpdate);
            }
            let updated = api.update_lesson(lesson_id, &update).await?;
            screen.show(&updated, |lesson| format!("Updated lesson #{}: {}", lesson.id, lesson.title))
        }
        LessonSubcommand::Delete { lesson_id, .. } => {
            api.delete_lesson(lesson_id).await?;
            screen.say(&format!("Deleted lesson {lesson_id}."));
            Ok(())
        }
    }
}

