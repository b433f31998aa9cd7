//! CMake syntax for directives.

use semver::Version;

use crate::core::export::TargetKind;
use crate::core::package::Compatibility;
use crate::directive::{DefineGuard, Directive, DirectiveSerializer, ImportedTarget};

const INDENT: &str = "  ";

/// Serializer producing CMake script.
#[derive(Debug, Clone, Default)]
pub struct CMakeSerializer;

impl CMakeSerializer {
    pub fn new() -> Self {
        CMakeSerializer
    }
}

impl DirectiveSerializer for CMakeSerializer {
    fn render(&self, directives: &[Directive]) -> String {
        let mut emitter = CMakeEmitter::new();
        emitter.emit_all(directives);
        emitter.finish()
    }

    fn package_init(&self, depth: usize) -> String {
        format!(
            r#"####### Expanded from PACKAGE_INIT by pkgmeta #######

get_filename_component(PACKAGE_PREFIX_DIR {} ABSOLUTE)

macro(set_and_check _var _file)
  set(${{_var}} "${{_file}}")
  if(NOT EXISTS "${{_file}}")
    message(FATAL_ERROR "File or directory ${{_file}} referenced by variable ${{_var}} does not exist !")
  endif()
endmacro()

macro(check_required_components _NAME)
  foreach(comp ${{${{_NAME}}_FIND_COMPONENTS}})
    if(NOT ${{_NAME}}_${{comp}}_FOUND)
      if(${{_NAME}}_FIND_REQUIRED_${{comp}})
        set(${{_NAME}}_FOUND FALSE)
      endif()
    endif()
  endforeach()
endmacro()

####################################################"#,
            quote(&list_dir_up(depth))
        )
    }

    fn prefix_relative(&self, relative: &str) -> String {
        if relative.is_empty() {
            "${PACKAGE_PREFIX_DIR}".to_string()
        } else {
            format!("${{PACKAGE_PREFIX_DIR}}/{}", relative)
        }
    }

    fn version_file(&self, version: &Version, compatibility: Compatibility) -> String {
        let mut emitter = CMakeEmitter::new();
        emitter.line("# Generated by pkgmeta. Do not edit.");
        emitter.line(&format!("set(PACKAGE_VERSION {})", quote(&version.to_string())));
        emitter.blank();

        let condition = match compatibility {
            Compatibility::Exact => {
                emitter.open("if(PACKAGE_FIND_VERSION VERSION_EQUAL PACKAGE_VERSION)");
                emitter.line("set(PACKAGE_VERSION_COMPATIBLE TRUE)");
                emitter.line("set(PACKAGE_VERSION_EXACT TRUE)");
                emitter.reopen("else()");
                emitter.line("set(PACKAGE_VERSION_COMPATIBLE FALSE)");
                emitter.close("endif()");
                return emitter.finish();
            }
            Compatibility::AnyNewer => None,
            Compatibility::SameMajor => Some(format!(
                "PACKAGE_FIND_VERSION_MAJOR STREQUAL {}",
                quote(&version.major.to_string())
            )),
            Compatibility::SameMinor => Some(format!(
                "PACKAGE_FIND_VERSION_MAJOR STREQUAL {} AND PACKAGE_FIND_VERSION_MINOR STREQUAL {}",
                quote(&version.major.to_string()),
                quote(&version.minor.to_string())
            )),
        };

        emitter.open("if(PACKAGE_VERSION VERSION_LESS PACKAGE_FIND_VERSION)");
        emitter.line("set(PACKAGE_VERSION_COMPATIBLE FALSE)");
        emitter.reopen("else()");
        match condition {
            None => emitter.line("set(PACKAGE_VERSION_COMPATIBLE TRUE)"),
            Some(condition) => {
                emitter.open(&format!("if({})", condition));
                emitter.line("set(PACKAGE_VERSION_COMPATIBLE TRUE)");
                emitter.reopen("else()");
                emitter.line("set(PACKAGE_VERSION_COMPATIBLE FALSE)");
                emitter.close("endif()");
            }
        }
        emitter.blank();
        emitter.open("if(PACKAGE_FIND_VERSION STREQUAL PACKAGE_VERSION)");
        emitter.line("set(PACKAGE_VERSION_EXACT TRUE)");
        emitter.close("endif()");
        emitter.close("endif()");

        emitter.finish()
    }
}

/// `${CMAKE_CURRENT_LIST_DIR}` followed by `depth` parent steps.
fn list_dir_up(depth: usize) -> String {
    let mut dir = "${CMAKE_CURRENT_LIST_DIR}".to_string();
    for _ in 0..depth {
        dir.push_str("/..");
    }
    dir
}

/// Quote an argument. `${...}` references stay live.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Quote a path argument, with `/` as the only separator.
fn quote_path(path: &str) -> String {
    quote(&path.replace('\\', "/"))
}

struct CMakeEmitter {
    code: String,
    indent: usize,
}

impl CMakeEmitter {
    fn new() -> Self {
        CMakeEmitter {
            code: String::new(),
            indent: 0,
        }
    }

    fn finish(self) -> String {
        self.code
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.code.push_str(INDENT);
        }
        self.code.push_str(text);
        self.code.push('\n');
    }

    fn blank(&mut self) {
        self.code.push('\n');
    }

    /// Emit a block opener and indent.
    fn open(&mut self, text: &str) {
        self.line(text);
        self.indent += 1;
    }

    /// Emit `else()`-style lines between two bodies.
    fn reopen(&mut self, text: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
        self.indent += 1;
    }

    fn close(&mut self, text: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }

    fn emit_all(&mut self, directives: &[Directive]) {
        for directive in directives {
            self.emit(directive);
        }
    }

    fn emit(&mut self, directive: &Directive) {
        match directive {
            Directive::Comment(text) => {
                for line in text.lines() {
                    if line.is_empty() {
                        self.line("#");
                    } else {
                        self.line(&format!("# {}", line));
                    }
                }
            }
            Directive::Blank => self.blank(),
            Directive::Set { var, value } => {
                self.line(&format!("set({} {})", var, quote(value)));
            }
            Directive::SetChecked { var, path } => {
                self.line(&format!("set_and_check({} {})", var, quote_path(path)));
            }
            Directive::Unset(var) => self.line(&format!("unset({})", var)),
            Directive::IfPathExists {
                path,
                require_nonempty,
                body,
            } => {
                self.open(&format!("if(EXISTS {})", quote_path(path)));
                if *require_nonempty {
                    self.line(&format!(
                        "file(GLOB _pkgmeta_contents {})",
                        quote_path(&format!("{}/*", path))
                    ));
                    self.open("if(_pkgmeta_contents)");
                    self.emit_all(body);
                    self.close("endif()");
                    self.line("unset(_pkgmeta_contents)");
                } else {
                    self.emit_all(body);
                }
                self.close("endif()");
            }
            Directive::IfComponent { component, body } => {
                self.open(&format!(
                    "if({} IN_LIST ${{CMAKE_FIND_PACKAGE_NAME}}_FIND_COMPONENTS)",
                    quote(component)
                ));
                self.emit_all(body);
                self.close("endif()");
            }
            Directive::Include { file, optional } => {
                let path = quote_path(&format!("${{CMAKE_CURRENT_LIST_DIR}}/{}", file));
                if *optional {
                    self.line(&format!("include({} OPTIONAL)", path));
                } else {
                    self.line(&format!("include({})", path));
                }
            }
            Directive::DefineIfAbsent(guard) => self.emit_define_guard(guard),
            Directive::ImportPrefix { depth } => {
                self.line(&format!(
                    "get_filename_component(_IMPORT_PREFIX {} ABSOLUTE)",
                    quote(&list_dir_up(*depth))
                ));
                self.open("if(_IMPORT_PREFIX STREQUAL \"/\")");
                self.line("set(_IMPORT_PREFIX \"\")");
                self.close("endif()");
            }
            Directive::ImportedTarget(target) => self.emit_imported_target(target),
            Directive::Fatal(message) => {
                self.line(&format!("message(FATAL_ERROR {})", quote(message)));
            }
            Directive::Raw(text) => {
                for line in text.lines() {
                    if line.trim().is_empty() {
                        self.blank();
                    } else {
                        self.line(line.trim_end());
                    }
                }
            }
        }
    }

    fn emit_define_guard(&mut self, guard: &DefineGuard) {
        self.line(&format!(
            "set(_pkgmeta_expected_targets {})",
            guard.targets.join(" ")
        ));
        self.line("set(_pkgmeta_defined_targets)");
        self.line("set(_pkgmeta_undefined_targets)");
        self.open("foreach(_pkgmeta_target IN LISTS _pkgmeta_expected_targets)");
        self.open("if(TARGET ${_pkgmeta_target})");
        self.line("list(APPEND _pkgmeta_defined_targets ${_pkgmeta_target})");
        self.reopen("else()");
        self.line("list(APPEND _pkgmeta_undefined_targets ${_pkgmeta_target})");
        self.close("endif()");
        self.close("endforeach()");
        self.line("unset(_pkgmeta_target)");
        self.open("if(NOT _pkgmeta_undefined_targets)");
        self.line("# All expected targets are already defined.");
        self.reopen("elseif(NOT _pkgmeta_defined_targets)");
        self.emit_all(&guard.commands);
        self.reopen("else()");
        self.line(
            "message(FATAL_ERROR \"Some (but not all) expected targets were already defined.\\n\
             Targets defined: ${_pkgmeta_defined_targets}\\n\
             Targets not yet defined: ${_pkgmeta_undefined_targets}\\n\")",
        );
        self.close("endif()");
        self.line("unset(_pkgmeta_expected_targets)");
        self.line("unset(_pkgmeta_defined_targets)");
        self.line("unset(_pkgmeta_undefined_targets)");
    }

    fn emit_imported_target(&mut self, target: &ImportedTarget) {
        self.open(&format!("if(NOT TARGET {})", target.name));
        match target.kind {
            TargetKind::Executable => {
                self.line(&format!("add_executable({} IMPORTED)", target.name));
            }
            TargetKind::Static => {
                self.line(&format!("add_library({} STATIC IMPORTED)", target.name));
            }
            TargetKind::Shared => {
                self.line(&format!("add_library({} SHARED IMPORTED)", target.name));
            }
            TargetKind::Interface => {
                self.line(&format!("add_library({} INTERFACE IMPORTED)", target.name));
            }
        }
        if target.kind != TargetKind::Interface {
            if let Some(ref location) = target.location {
                self.line(&format!(
                    "set_target_properties({} PROPERTIES IMPORTED_LOCATION {})",
                    target.name,
                    quote_path(&format!("${{_IMPORT_PREFIX}}/{}", location))
                ));
            }
        }
        self.close("endif()");
    }
}
