use std::fs;
use std::path::{Path, PathBuf};
use std::process::{self, Command};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{CompileError, CompileResult};

#[cfg(test)]
pub mod test;

const ASSEMBLER: &str = "nasm";
const LINKER: &str = "ld";

/// A bundle of generated assembly plus its build behavior. The unnamed
/// top-level unit is linked to an executable; named child units (such as
/// the builtins library) are only assembled.
#[derive(Debug)]
pub struct Program {
    assembly_source: String,
    name: Option<String>,
    children: Vec<Program>,
    executable_path: Option<PathBuf>,
}

impl Program {
    pub fn new(assembly_source: String) -> Self {
        Program {
            assembly_source,
            name: None,
            children: Vec::new(),
            executable_path: None,
        }
    }

    pub fn named(name: impl Into<String>, assembly_source: String) -> Self {
        Program {
            assembly_source,
            name: Some(name.into()),
            children: Vec::new(),
            executable_path: None,
        }
    }

    pub fn add_child(&mut self, child: Program) {
        self.children.push(child);
    }

    pub fn assembly_source(&self) -> &str {
        &self.assembly_source
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn children(&self) -> &[Program] {
        &self.children
    }

    pub fn executable_path(&self) -> Option<&Path> {
        self.executable_path.as_deref()
    }

    /// Materializes this unit and all of its children, assembles them,
    /// and links the top-level unit to an executable at `output_path`.
    /// With `full_output` the intermediate files persist under `output/`
    /// next to the executable; otherwise they are removed on every exit
    /// path, including tool failure.
    pub fn compile(&mut self, output_path: &Path, full_output: bool) -> CompileResult<()> {
        let dir = match output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        // Absolute paths throughout, so the assembler's working
        // directory never changes what the file arguments mean.
        let dir = fs::canonicalize(&dir).unwrap_or(dir);
        let mut transients = Transients::default();
        self.compile_in(&dir, output_path, full_output, &mut transients)
    }

    fn compile_in(
        &mut self,
        dir: &Path,
        output_path: &Path,
        full_output: bool,
        transients: &mut Transients,
    ) -> CompileResult<()> {
        // Children first, so the include paths the parent references
        // exist on disk before the assembler runs.
        let lib_dir = dir.join("output").join("lib");
        for child in &mut self.children {
            child.compile_child(&lib_dir, full_output, transients)?;
        }

        let (asm_path, obj_path) = self.unit_paths(dir, output_path, full_output, transients)?;
        write_source(&asm_path, &self.assembly_source)?;
        assemble(dir, &asm_path, &obj_path)?;

        // Only the top-level unit gets linked.
        if self.name.is_none() {
            link(&obj_path, output_path)?;
            self.executable_path =
                Some(fs::canonicalize(output_path).unwrap_or_else(|_| output_path.to_path_buf()));
        }
        Ok(())
    }

    fn compile_child(
        &mut self,
        lib_dir: &Path,
        full_output: bool,
        transients: &mut Transients,
    ) -> CompileResult<()> {
        for child in &mut self.children {
            child.compile_child(lib_dir, full_output, transients)?;
        }

        // The include path is fixed, so even transient child files must
        // land at their real location and be removed afterwards.
        let stem = self.name.as_deref().unwrap_or("unit");
        let asm_path = lib_dir.join(format!("{stem}.asm"));
        let obj_path = lib_dir.join(format!("{stem}.o"));
        ensure_dir(lib_dir, full_output, transients)?;
        if !full_output {
            transients.file(asm_path.clone());
            transients.file(obj_path.clone());
        }
        write_source(&asm_path, &self.assembly_source)?;
        assemble(lib_dir, &asm_path, &obj_path)
    }

    fn unit_paths(
        &self,
        dir: &Path,
        output_path: &Path,
        full_output: bool,
        transients: &mut Transients,
    ) -> CompileResult<(PathBuf, PathBuf)> {
        let stem = output_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "out".to_string());
        if full_output {
            let out_dir = dir.join("output");
            ensure_dir(&out_dir, full_output, transients)?;
            Ok((
                out_dir.join(format!("{stem}.asm")),
                out_dir.join(format!("{stem}.o")),
            ))
        } else {
            let tag = format!("{}-{}", process::id(), subsec_nanos());
            let asm_path = dir.join(format!(".{stem}-{tag}.asm"));
            let obj_path = dir.join(format!(".{stem}-{tag}.o"));
            transients.file(asm_path.clone());
            transients.file(obj_path.clone());
            Ok((asm_path, obj_path))
        }
    }

    /// Executes the built program with inherited standard streams and
    /// reports its exit code. Never builds implicitly.
    pub fn run(&self) -> CompileResult<i32> {
        let Some(path) = &self.executable_path else {
            return Err(CompileError::NotYetBuilt);
        };
        if !path.exists() {
            return Err(CompileError::NotYetBuilt);
        }
        let status = Command::new(path).status().map_err(|err| CompileError::Build {
            tool: path.display().to_string(),
            diagnostics: err.to_string(),
        })?;
        Ok(status.code().unwrap_or(-1))
    }
}

fn assemble(include_root: &Path, asm_path: &Path, obj_path: &Path) -> CompileResult<()> {
    let nasm = find_tool(ASSEMBLER)?;
    let output = Command::new(nasm)
        .arg("-f")
        .arg("elf64")
        .arg(format!("-i{}/", include_root.display()))
        .arg("-o")
        .arg(obj_path)
        .arg(asm_path)
        .current_dir(include_root)
        .output()
        .map_err(|err| tool_error(ASSEMBLER, err.to_string()))?;
    if output.status.success() {
        Ok(())
    } else {
        Err(tool_error(
            ASSEMBLER,
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ))
    }
}

fn link(obj_path: &Path, output_path: &Path) -> CompileResult<()> {
    let ld = find_tool(LINKER)?;
    let output = Command::new(ld)
        .arg("-o")
        .arg(output_path)
        .arg(obj_path)
        .output()
        .map_err(|err| tool_error(LINKER, err.to_string()))?;
    if output.status.success() {
        Ok(())
    } else {
        Err(tool_error(
            LINKER,
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ))
    }
}

fn find_tool(tool: &str) -> CompileResult<PathBuf> {
    which::which(tool).map_err(|_| tool_error(tool, format!("{tool} not found in PATH")))
}

fn tool_error(tool: &str, diagnostics: String) -> CompileError {
    CompileError::Build {
        tool: tool.to_string(),
        diagnostics,
    }
}

fn write_source(path: &Path, source: &str) -> CompileResult<()> {
    fs::write(path, source).map_err(|err| CompileError::Build {
        tool: format!("write {}", path.display()),
        diagnostics: err.to_string(),
    })
}

fn ensure_dir(dir: &Path, full_output: bool, transients: &mut Transients) -> CompileResult<()> {
    if !full_output && !dir.exists() {
        if let Some(parent) = dir.parent() {
            if !parent.exists() {
                transients.dir(parent.to_path_buf());
            }
        }
        transients.dir(dir.to_path_buf());
    }
    fs::create_dir_all(dir).map_err(|err| CompileError::Build {
        tool: format!("mkdir {}", dir.display()),
        diagnostics: err.to_string(),
    })
}

fn subsec_nanos() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos())
        .unwrap_or(0)
}

/// Scoped cleanup of transient build artifacts: everything registered
/// here is removed when the guard drops, success or failure alike.
#[derive(Debug, Default)]
struct Transients {
    files: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
}

impl Transients {
    fn file(&mut self, path: PathBuf) {
        self.files.push(path);
    }

    fn dir(&mut self, path: PathBuf) {
        self.dirs.push(path);
    }
}

impl Drop for Transients {
    fn drop(&mut self) {
        for file in &self.files {
            let _ = fs::remove_file(file);
        }
        for dir in self.dirs.iter().rev() {
            let _ = fs::remove_dir(dir);
        }
    }
}
