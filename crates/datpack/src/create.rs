use std::{
  path::{Path, PathBuf},
  str::FromStr,
};

use chrono::Local;
use clap::ValueEnum;
use datpack_assets::{import_bitmap, import_font, import_palette, import_rle_sprite};
use datpack_library::dat::{
  Archive, Body, Object, Property,
  body::FontSize,
};
use snafu::{ResultExt, Whatever, ensure_whatever};
use tracing::info;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
  Bmp,
  Pal,
  Rle,
  Font8,
  Font16,
}

/// One `KIND=PATH` argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Input {
  pub kind: InputKind,
  pub path: PathBuf,
}

impl FromStr for Input {
  type Err = String;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    let (kind, path) = value
      .split_once('=')
      .ok_or_else(|| format!("expected KIND=PATH, got {value:?}"))?;
    if path.is_empty() {
      return Err(format!("no path given for {kind}"));
    }
    Ok(Self {
      kind: InputKind::from_str(kind, true)?,
      path: PathBuf::from(path),
    })
  }
}

impl Input {
  fn import(&self, threshold: u8) -> Result<Body, Whatever> {
    let path = &self.path;
    let body = match self.kind {
      InputKind::Bmp => import_bitmap(path)
        .with_whatever_context(|_| format!("cannot load bitmap {}", path.display()))?
        .into(),
      InputKind::Pal => import_palette(path)
        .with_whatever_context(|_| format!("cannot load palette {}", path.display()))?
        .into(),
      InputKind::Rle => import_rle_sprite(path)
        .with_whatever_context(|_| format!("cannot load sprite {}", path.display()))?
        .into(),
      InputKind::Font8 => import_font(path, FontSize::Eight, threshold)
        .with_whatever_context(|_| format!("cannot load 8 pixel font {}", path.display()))?
        .into(),
      InputKind::Font16 => import_font(path, FontSize::Sixteen, threshold)
        .with_whatever_context(|_| format!("cannot load 16 pixel font {}", path.display()))?
        .into(),
    };
    Ok(body)
  }
}

/// Imports every input, tagging each object with when and where it came from.
/// Nothing is written unless every input imports.
pub fn build(inputs: &[Input], threshold: u8, date: &str) -> Result<Archive, Whatever> {
  ensure_whatever!(!inputs.is_empty(), "no objects to write");

  let mut archive = Archive::new();
  for input in inputs {
    let body = input.import(threshold)?;
    let name = input
      .path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_default();
    info!("{:?} {} as {name}", input.kind, input.path.display());

    archive.push(
      Object::new(body)
        .with_property(Property::DATE, date)
        .with_property(Property::NAME, name)
        .with_property(Property::ORIG, input.path.to_string_lossy().into_owned()),
    );
  }
  Ok(archive)
}

pub fn run(output: &Path, inputs: &[Input], threshold: u8) -> Result<(), Whatever> {
  let date = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
  let archive = build(inputs, threshold, &date)?;
  archive
    .write_to_path(output)
    .with_whatever_context(|_| format!("failed to write {}", output.display()))?;

  println!(
    "wrote {} ({} objects)",
    output.display(),
    archive.objects.len()
  );
  Ok(())
}
