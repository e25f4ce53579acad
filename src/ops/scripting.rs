// ============================================================================
// Gesture scripting: a sandboxed Rhai engine that drives a Project
// ============================================================================
//
// Scripts replay pointer gestures and style changes against a document the
// same way the desktop shell does, which makes batch drawing and regression
// fixtures possible without a window.

use rhai::{Engine, EvalAltResult, ImmutableString, Position, Scope};
use std::sync::{Arc, Mutex};

use crate::components::tools::{PointerButton, Tool};
use crate::project::Project;

// ============================================================================
// Error type
// ============================================================================

#[derive(Debug, Clone)]
pub struct ScriptError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl ScriptError {
    fn at(message: String, pos: Position) -> Self {
        Self {
            message,
            line: pos.line().filter(|&l| l > 0),
            column: pos.position().filter(|&c| c > 0),
        }
    }

    /// Error explanation with line/column context and a hint where one helps.
    pub fn friendly_message(&self) -> String {
        let raw = &self.message;
        let mut parts = Vec::new();

        match (self.line, self.column) {
            (Some(line), Some(col)) => parts.push(format!("Error on line {}, column {}:", line, col)),
            (Some(line), None) => parts.push(format!("Error on line {}:", line)),
            _ => parts.push("Script error:".to_string()),
        }

        let cleaned = raw.split(" (line ").next().unwrap_or(raw);
        if raw.contains("Function not found:") {
            parts.push(format!("  {}", cleaned));
            parts.push(String::new());
            parts.push(
                "  Tip: available calls are new_canvas, resize, tool, color, width, fill, glow,"
                    .to_string(),
            );
            parts.push(
                "  grid, down, drag, up, stroke, undo, redo, canvas_width, canvas_height.".to_string(),
            );
        } else if raw.contains("Variable not found:") {
            parts.push(format!("  {}", cleaned));
            parts.push(String::new());
            parts.push("  Tip: declare variables with 'let' before using them.".to_string());
        } else if raw.contains("Syntax error") || raw.contains("Expected") {
            parts.push(format!("  Syntax error: {}", cleaned));
            parts.push(String::new());
            parts.push(
                "  Tip: Check for missing semicolons, brackets, or typos near this line."
                    .to_string(),
            );
        } else if raw.contains("Too many operations") {
            parts.push(
                "  Script exceeded the maximum operation limit (50 million ops).".to_string(),
            );
            parts.push(String::new());
            parts.push("  Tip: Your script may contain an infinite loop.".to_string());
        } else {
            parts.push(format!("  {}", cleaned));
        }

        parts.join("\n")
    }
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let (Some(line), Some(col)) = (self.line, self.column) {
            write!(f, "Line {}, Col {}: {}", line, col, self.message)
        } else if let Some(line) = self.line {
            write!(f, "Line {}: {}", line, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ScriptError {}

// ============================================================================
// Script context: shared mutable state between engine and host functions
// ============================================================================

struct ScriptContext {
    project: Project,
    console_output: Vec<String>,
}

type SharedContext = Arc<Mutex<ScriptContext>>;

/// What a finished script leaves behind.
pub struct ScriptOutcome {
    pub project: Project,
    pub console_output: Vec<String>,
}

fn with_project<R>(ctx: &SharedContext, f: impl FnOnce(&mut Project) -> R) -> R {
    let mut lock = ctx.lock().unwrap_or_else(|e| e.into_inner());
    f(&mut lock.project)
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

fn channel(v: i64) -> u8 {
    v.clamp(0, 255) as u8
}

// ============================================================================
// Engine construction with sandbox + API registration
// ============================================================================

fn create_engine(ctx: SharedContext) -> Engine {
    let mut engine = Engine::new();

    // ── Sandbox limits ──
    engine.set_max_operations(50_000_000);
    engine.set_max_call_levels(64);
    engine.set_max_expr_depths(64, 64);
    engine.set_max_string_size(10_000);
    engine.set_max_array_size(10_000);
    engine.set_max_map_size(1_000);

    register_document_api(&mut engine, ctx.clone());
    register_style_api(&mut engine, ctx.clone());
    register_pointer_api(&mut engine, ctx.clone());
    register_utility_api(&mut engine, ctx);

    engine
}

fn register_document_api(engine: &mut Engine, ctx: SharedContext) {
    let c = ctx.clone();
    engine.register_fn("new_canvas", move |w: i64, h: i64| {
        with_project(&c, |p| {
            p.create_canvas(clamp_i32(w), clamp_i32(h));
        });
    });

    let c = ctx.clone();
    engine.register_fn("resize", move |w: i64, h: i64| -> bool {
        with_project(&c, |p| p.resize_surface(clamp_i32(w), clamp_i32(h)))
    });

    let c = ctx.clone();
    engine.register_fn("canvas_width", move || -> i64 {
        with_project(&c, |p| p.canvas_state.size().map_or(0, |(w, _)| w as i64))
    });

    let c = ctx.clone();
    engine.register_fn("canvas_height", move || -> i64 {
        with_project(&c, |p| p.canvas_state.size().map_or(0, |(_, h)| h as i64))
    });

    let c = ctx.clone();
    engine.register_fn("undo", move || -> bool { with_project(&c, Project::undo) });

    let c = ctx;
    engine.register_fn("redo", move || -> bool { with_project(&c, Project::redo) });
}

fn register_style_api(engine: &mut Engine, ctx: SharedContext) {
    let c = ctx.clone();
    engine.register_fn(
        "tool",
        move |name: ImmutableString| -> Result<(), Box<EvalAltResult>> {
            let tool = Tool::from_name(name.as_str())
                .ok_or_else(|| format!("Unknown tool '{}' (pen, eraser, line, rect, ellipse)", name))?;
            with_project(&c, |p| p.set_tool(tool));
            Ok(())
        },
    );

    let c = ctx.clone();
    engine.register_fn("color", move |r: i64, g: i64, b: i64| {
        with_project(&c, |p| p.set_color(channel(r), channel(g), channel(b)));
    });

    let c = ctx.clone();
    engine.register_fn("width", move |px: i64| {
        with_project(&c, |p| p.set_brush_width(clamp_i32(px)));
    });

    let c = ctx.clone();
    engine.register_fn("fill", move |on: bool| {
        with_project(&c, |p| p.set_fill_enabled(on));
    });

    let c = ctx.clone();
    engine.register_fn("glow", move |on: bool| {
        with_project(&c, |p| p.set_glow_enabled(on));
    });

    let c = ctx;
    engine.register_fn("grid", move |on: bool| {
        with_project(&c, |p| p.set_grid_overlay(on));
    });
}

fn register_pointer_api(engine: &mut Engine, ctx: SharedContext) {
    let c = ctx.clone();
    engine.register_fn("down", move |x: i64, y: i64| -> bool {
        with_project(&c, |p| p.pointer_down(clamp_i32(x), clamp_i32(y), PointerButton::Primary))
    });

    let c = ctx.clone();
    engine.register_fn("drag", move |x: i64, y: i64| -> bool {
        with_project(&c, |p| p.pointer_move(clamp_i32(x), clamp_i32(y)))
    });

    let c = ctx.clone();
    engine.register_fn("up", move |x: i64, y: i64| -> bool {
        with_project(&c, |p| p.pointer_up(clamp_i32(x), clamp_i32(y), PointerButton::Primary))
    });

    // stroke(x0, y0, x1, y1): one complete gesture.
    let c = ctx;
    engine.register_fn("stroke", move |x0: i64, y0: i64, x1: i64, y1: i64| -> bool {
        with_project(&c, |p| {
            let started = p.pointer_down(clamp_i32(x0), clamp_i32(y0), PointerButton::Primary);
            p.pointer_move(clamp_i32(x1), clamp_i32(y1));
            p.pointer_up(clamp_i32(x1), clamp_i32(y1), PointerButton::Primary);
            started
        })
    });
}

fn register_utility_api(engine: &mut Engine, ctx: SharedContext) {
    let c = ctx;
    engine.on_print(move |msg| {
        let mut lock = c.lock().unwrap_or_else(|e| e.into_inner());
        lock.console_output.push(msg.to_string());
    });
}

// ============================================================================
// Entry point
// ============================================================================

/// Run `source` against `project` on the calling thread.
pub fn execute_script(source: &str, project: Project) -> Result<ScriptOutcome, ScriptError> {
    let ctx = Arc::new(Mutex::new(ScriptContext {
        project,
        console_output: Vec::new(),
    }));

    let engine = create_engine(ctx.clone());
    let mut scope = Scope::new();

    let ast = engine
        .compile(source)
        .map_err(|e| ScriptError::at(e.to_string(), e.position()))?;
    engine
        .run_ast_with_scope(&mut scope, &ast)
        .map_err(|e| ScriptError::at(e.to_string(), e.position()))?;
    drop(engine);

    let mut lock = ctx.lock().unwrap_or_else(|e| e.into_inner());
    Ok(ScriptOutcome {
        project: std::mem::take(&mut lock.project),
        console_output: std::mem::take(&mut lock.console_output),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::WHITE;
    use image::Rgba;

    fn run(source: &str) -> Result<ScriptOutcome, ScriptError> {
        execute_script(source, Project::new_untitled(1))
    }

    fn run_failing(source: &str) -> ScriptError {
        match run(source) {
            Ok(_) => panic!("script was expected to fail: {source}"),
            Err(e) => e,
        }
    }

    #[test]
    fn script_draws_through_the_gesture_machine() {
        let out = run(
            r#"
            new_canvas(800, 600);
            tool("line");
            color(255, 0, 0);
            width(6);
            stroke(10, 100, 300, 100);
            "#,
        )
        .unwrap();
        let buf = out.project.canvas_state.committed().unwrap();
        assert_eq!(buf.get_pixel(150, 100), Rgba([255, 0, 0, 255]));
        assert_eq!(buf.get_pixel(150, 200), WHITE);
        assert_eq!(out.project.history.undo_count(), 1);
    }

    #[test]
    fn print_and_queries_are_captured() {
        let out = run(
            r#"
            new_canvas(10, 10);
            print(`${canvas_width()}x${canvas_height()}`);
            resize(1024, 600);
            print(canvas_width());
            "#,
        )
        .unwrap();
        assert_eq!(out.console_output, vec!["800x600".to_string(), "1024".to_string()]);
    }

    #[test]
    fn undo_and_redo_report_availability() {
        let out = run(
            r#"
            new_canvas(800, 600);
            let empty = undo();
            stroke(5, 5, 40, 40);
            let back = undo();
            let again = redo();
            print(`${empty} ${back} ${again}`);
            "#,
        )
        .unwrap();
        assert_eq!(out.console_output, vec!["false true true".to_string()]);
    }

    #[test]
    fn drawing_before_a_canvas_is_a_no_op() {
        let out = run("print(down(5, 5)); up(5, 5);").unwrap();
        assert_eq!(out.console_output, vec!["false".to_string()]);
        assert!(out.project.canvas_state.committed().is_none());
    }

    #[test]
    fn unknown_tool_is_a_runtime_error_with_position() {
        let err = run_failing("new_canvas(800, 600);\ntool(\"spray\");");
        assert!(err.message.contains("spray"));
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn syntax_errors_are_reported_with_a_tip() {
        let err = run_failing("let x = ;");
        assert_eq!(err.line, Some(1));
        assert!(err.friendly_message().starts_with("Error on line 1"));
    }

    #[test]
    fn unknown_functions_list_the_api() {
        let err = run_failing("explode();");
        assert!(err.friendly_message().contains("canvas_width"));
    }

    #[test]
    fn extreme_coordinates_and_sizes_do_not_abort_the_script() {
        let out = run(
            r#"
            new_canvas(800, 600);
            tool("rect");
            down(-2147483648, 0);
            up(2147483647, 10);
            resize(9999999999, 9999999999);
            print(canvas_width());
            "#,
        )
        .unwrap();
        assert_eq!(out.console_output, vec!["16384".to_string()]);
        assert_eq!(out.project.history.undo_count(), 1);
    }

    #[test]
    fn display_includes_location() {
        let err = ScriptError {
            message: "boom".into(),
            line: Some(3),
            column: Some(7),
        };
        assert_eq!(err.to_string(), "Line 3, Col 7: boom");
    }
}
