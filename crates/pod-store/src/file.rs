//! A resource store backed by a directory tree.
//!
//! Identifiers map onto paths below a root directory by stripping the base
//! URI. Containers are directories, resources are files. Extra metadata for a
//! resource lives in a Turtle sidecar next to it (`<name>.metadata`), and for
//! a container in a `.metadata` file inside it. Sidecars and in-flight
//! temporary files never show up in listings.

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use pod_rdf::{parse_turtle, write_turtle, GraphName, Literal, NamedNode, Quad, Term};
use pod_types::vocab::{dcterms, ldp, posix, rdf, xsd};
use pod_types::{
    trim_trailing_slashes, Data, DataType, Diagnostics, HttpError, HttpResult, Patch,
    Representation, RepresentationMetadata, RepresentationPreferences, ResourceIdentifier,
};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::interaction::{is_reserved_name, InteractionController};
use crate::mime::content_type_for;
use crate::store::ResourceStore;

/// Name of a container's sidecar, and suffix of a resource's.
const METADATA: &str = ".metadata";

/// Stores resources as files below `root`.
#[derive(Debug)]
pub struct FileResourceStore {
    base: String,
    root: PathBuf,
    interaction: InteractionController,
    diagnostics: Diagnostics,
}

impl FileResourceStore {
    /// `base_url` is stored without trailing slashes; `http://pod/` and
    /// `http://pod` both name the root container.
    pub fn new(base_url: &str, root: impl Into<PathBuf>) -> Self {
        Self {
            base: trim_trailing_slashes(base_url).to_string(),
            root: root.into(),
            interaction: InteractionController::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ---------------------------------------------------------------
    // Identifier mapping
    // ---------------------------------------------------------------

    /// The part of `identifier` below the base, always starting with `/`.
    ///
    /// Identifiers outside the base, with empty inner segments, or naming
    /// hidden and sidecar files are not found.
    fn relative_path(&self, identifier: &ResourceIdentifier) -> HttpResult<String> {
        let rel = identifier
            .path()
            .strip_prefix(self.base.as_str())
            .filter(|rel| rel.is_empty() || rel.starts_with('/'))
            .ok_or_else(|| {
                HttpError::not_found(format!("{identifier} is not inside {}", self.base))
            })?;
        let rel = if rel.is_empty() { "/" } else { rel };

        let segments: Vec<&str> = rel[1..].split('/').collect();
        let last = segments.len() - 1;
        for (i, segment) in segments.iter().enumerate() {
            let trailing = i == last && segment.is_empty();
            if !trailing && is_reserved_name(segment) {
                return Err(HttpError::not_found(format!("{identifier} does not exist")));
            }
        }
        Ok(rel.to_string())
    }

    fn file_path(&self, rel: &str) -> PathBuf {
        self.root.join(rel.trim_matches('/'))
    }

    fn identifier_for(&self, rel: &str) -> ResourceIdentifier {
        ResourceIdentifier::new(format!("{}{rel}", self.base))
    }

    async fn stat(&self, path: &Path, identifier: &ResourceIdentifier) -> HttpResult<Metadata> {
        fs::symlink_metadata(path)
            .await
            .map_err(|_| HttpError::not_found(format!("{identifier} does not exist")))
    }

    // ---------------------------------------------------------------
    // Reading
    // ---------------------------------------------------------------

    async fn file_representation(
        &self,
        identifier: &ResourceIdentifier,
        path: &Path,
        stats: &Metadata,
    ) -> HttpResult<Representation> {
        let file = fs::File::open(path).await?;
        let metadata = RepresentationMetadata {
            content_type: content_type_for(path).map(str::to_string),
            byte_size: Some(stats.len()),
            modified: stats.modified().ok().map(DateTime::<Utc>::from),
            raw: self.read_sidecar(&sidecar_path(path), identifier).await?,
            ..RepresentationMetadata::default()
        };
        Ok(Representation::binary(file, metadata))
    }

    async fn container_representation(
        &self,
        rel: &str,
        path: &Path,
        stats: &Metadata,
    ) -> HttpResult<Representation> {
        let identifier = self.identifier_for(rel);
        let subject = NamedNode::new_unchecked(identifier.path());
        let mut quads = self.read_sidecar(&path.join(METADATA), &identifier).await?;
        quads.extend(resource_quads(&subject, stats));

        let mut names = Vec::new();
        let mut entries = fs::read_dir(path).await?;
        while let Some(entry) = entries.next_entry().await? {
            if let Ok(name) = entry.file_name().into_string() {
                if !is_reserved_name(&name) {
                    names.push(name);
                }
            }
        }
        names.sort();

        for name in names {
            // Entries can disappear between listing and stat.
            let Ok(child) = fs::symlink_metadata(path.join(&name)).await else {
                continue;
            };
            let child_id = if child.is_dir() {
                format!("{}{name}/", identifier.path())
            } else if child.is_file() {
                format!("{}{name}", identifier.path())
            } else {
                continue;
            };
            let child_node = NamedNode::new_unchecked(child_id);
            quads.push(Quad::new(
                subject.clone(),
                iri(ldp::CONTAINS),
                child_node.clone(),
                GraphName::DefaultGraph,
            ));
            quads.extend(resource_quads(&child_node, &child));
        }

        let metadata = RepresentationMetadata {
            modified: stats.modified().ok().map(DateTime::<Utc>::from),
            ..RepresentationMetadata::default()
        };
        Ok(Representation::quads(quads, metadata))
    }

    // ---------------------------------------------------------------
    // Writing
    // ---------------------------------------------------------------

    /// Write a resource file named `name` inside the container at
    /// `parent_rel`, committing its sidecar first.
    async fn write_file(
        &self,
        parent_rel: &str,
        name: &str,
        mut representation: Representation,
        allow_recursive: bool,
    ) -> HttpResult<()> {
        let dir = self.file_path(parent_rel);
        if allow_recursive {
            fs::create_dir_all(&dir).await.map_err(|_| not_a_container())?;
        }
        ensure_dir(&dir).await?;

        let path = dir.join(name);
        let sidecar = sidecar_path(&path);
        let raw = std::mem::take(&mut representation.metadata.raw);
        let wrote_sidecar = if raw.is_empty() {
            remove_if_present(&sidecar).await?;
            false
        } else {
            let text = write_turtle(&raw)?;
            self.atomic_write(&sidecar, &mut text.as_bytes()).await?;
            true
        };

        let Data::Binary(mut stream) = representation.take_data()? else {
            return Err(binary_only());
        };
        if let Err(err) = self.atomic_write(&path, &mut stream).await {
            if wrote_sidecar {
                self.roll_back(&sidecar, false).await;
            }
            return Err(err);
        }
        self.diagnostics
            .in_scope(|| debug!(path = %path.display(), "wrote resource"));
        Ok(())
    }

    /// Create the directory `name` inside the container at `parent_rel`.
    /// A container whose sidecar cannot be written is removed again.
    async fn create_container(
        &self,
        parent_rel: &str,
        name: &str,
        mut representation: Representation,
        allow_recursive: bool,
    ) -> HttpResult<()> {
        let dir = self.file_path(parent_rel);
        if allow_recursive {
            fs::create_dir_all(&dir).await.map_err(|_| not_a_container())?;
        }
        ensure_dir(&dir).await?;

        let path = dir.join(name.trim_end_matches('/'));
        match fs::create_dir(&path).await {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(HttpError::Conflict(
                    "Resource with that identifier already exists.".into(),
                ))
            }
            Err(err) => return Err(HttpError::internal(err.to_string())),
        }

        let raw = std::mem::take(&mut representation.metadata.raw);
        if !raw.is_empty() {
            let written = match write_turtle(&raw) {
                Ok(text) => self.atomic_write(&path.join(METADATA), &mut text.as_bytes()).await,
                Err(err) => Err(err.into()),
            };
            if let Err(err) = written {
                self.roll_back(&path, true).await;
                return Err(err);
            }
        }
        self.diagnostics
            .in_scope(|| debug!(path = %path.display(), "created container"));
        Ok(())
    }

    async fn read_sidecar(
        &self,
        path: &Path,
        identifier: &ResourceIdentifier,
    ) -> HttpResult<Vec<Quad>> {
        let text = match fs::read_to_string(path).await {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(HttpError::internal(format!("{}: {err}", path.display()))),
        };
        parse_turtle(&text, Some(identifier.path())).map_err(|err| {
            self.diagnostics.in_scope(|| {
                warn!(path = %path.display(), error = %err, "unreadable metadata sidecar")
            });
            HttpError::internal(format!("invalid metadata for {identifier}: {err}"))
        })
    }

    /// Stream `reader` into `.<name>.<uuid>.tmp` next to `path`, then rename it
    /// into place. The temp file is removed on failure.
    async fn atomic_write<R>(&self, path: &Path, reader: &mut R) -> HttpResult<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("resource");
        let temp = path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4()));

        let result = async {
            let mut file = fs::File::create(&temp).await?;
            let written = tokio::io::copy(reader, &mut file).await?;
            file.flush().await?;
            file.sync_all().await?;
            fs::rename(&temp, path).await?;
            Ok::<_, io::Error>(written)
        }
        .await;

        match result {
            Ok(written) => Ok(written),
            Err(err) => {
                self.roll_back(&temp, false).await;
                Err(HttpError::internal(format!("failed to write {}: {err}", path.display())))
            }
        }
    }

    /// Remove what a failed write left behind. Failures are logged, not
    /// returned.
    async fn roll_back(&self, path: &Path, is_dir: bool) {
        let result = if is_dir {
            fs::remove_dir(path).await
        } else {
            fs::remove_file(path).await
        };
        self.diagnostics.in_scope(|| match result {
            Ok(()) => debug!(path = %path.display(), "rolled back partial write"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %path.display(), error = %err, "failed to roll back partial write"),
        });
    }
}

#[async_trait]
impl ResourceStore for FileResourceStore {
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        _preferences: &RepresentationPreferences,
    ) -> HttpResult<Representation> {
        let rel = self.relative_path(identifier)?;
        let path = self.file_path(&rel);
        let stats = self.stat(&path, identifier).await?;
        let wants_container = rel.ends_with('/');

        if stats.is_file() && !wants_container {
            self.file_representation(identifier, &path, &stats).await
        } else if stats.is_dir() && wants_container {
            self.container_representation(&rel, &path, &stats).await
        } else if stats.is_file() || stats.is_dir() {
            Err(HttpError::not_found(format!("{identifier} does not exist")))
        } else {
            Err(HttpError::Conflict("Not a valid resource.".into()))
        }
    }

    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
    ) -> HttpResult<()> {
        ensure_binary(&representation)?;
        let rel = self.relative_path(identifier)?;
        if rel == "/" {
            return Err(HttpError::MethodNotAllowed(
                "The root container cannot be replaced.".into(),
            ));
        }

        let (parent, slug) = split_last(&rel);
        let is_container = self
            .interaction
            .is_container(Some(slug), &representation.metadata.link_types);
        let name = self.interaction.generate_identifier(is_container, Some(slug));
        let path = self.file_path(&format!("{parent}{name}"));
        let existing = fs::symlink_metadata(&path).await.ok();

        if is_container {
            if existing.is_some() {
                return Err(HttpError::Conflict(
                    "Resource with that identifier already exists.".into(),
                ));
            }
            self.create_container(parent, &name, representation, true).await
        } else {
            if existing.is_some_and(|stats| !stats.is_file()) {
                return Err(HttpError::Conflict(
                    "Container with that identifier already exists.".into(),
                ));
            }
            self.write_file(parent, &name, representation, true).await
        }
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
    ) -> HttpResult<ResourceIdentifier> {
        ensure_binary(&representation)?;
        let rel = self.relative_path(container)?;
        if !rel.ends_with('/') {
            return Err(not_a_container());
        }
        let parent = self.interaction.container_of(&rel);

        let slug = representation.metadata.slug.clone();
        let is_container = self
            .interaction
            .is_container(slug.as_deref(), &representation.metadata.link_types);
        let mut name = self.interaction.generate_identifier(is_container, slug.as_deref());
        if fs::symlink_metadata(self.file_path(&format!("{parent}{name}"))).await.is_ok() {
            name = self.interaction.generate_identifier(is_container, None);
        }

        if is_container {
            self.create_container(&parent, &name, representation, true).await?;
        } else {
            self.write_file(&parent, &name, representation, true).await?;
        }
        Ok(self.identifier_for(&format!("{parent}{name}")))
    }

    async fn delete_resource(&self, identifier: &ResourceIdentifier) -> HttpResult<()> {
        let rel = self.relative_path(identifier)?;
        if rel == "/" {
            return Err(HttpError::MethodNotAllowed("Cannot delete root container.".into()));
        }
        let path = self.file_path(&rel);
        let stats = self.stat(&path, identifier).await?;
        let wants_container = rel.ends_with('/');

        if stats.is_file() && !wants_container {
            fs::remove_file(&path).await?;
            remove_if_present(&sidecar_path(&path)).await?;
        } else if stats.is_dir() && wants_container {
            let mut leftovers = Vec::new();
            let mut entries = fs::read_dir(&path).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name();
                if !is_internal_file(&name.to_string_lossy()) {
                    return Err(HttpError::Conflict("Container is not empty.".into()));
                }
                leftovers.push(entry.path());
            }
            for leftover in leftovers {
                remove_if_present(&leftover).await?;
            }
            fs::remove_dir(&path).await?;
        } else {
            return Err(HttpError::not_found(format!("{identifier} does not exist")));
        }

        self.diagnostics
            .in_scope(|| debug!(identifier = %identifier, "deleted"));
        Ok(())
    }

    async fn modify_resource(&self, identifier: &ResourceIdentifier, _patch: Patch) -> HttpResult<()> {
        Err(HttpError::not_implemented(format!(
            "{identifier}: the file store cannot apply patches"
        )))
    }

    async fn resource_exists(&self, identifier: &ResourceIdentifier) -> HttpResult<bool> {
        let Ok(rel) = self.relative_path(identifier) else {
            return Ok(false);
        };
        Ok(match fs::symlink_metadata(self.file_path(&rel)).await {
            Ok(stats) if rel.ends_with('/') => stats.is_dir(),
            Ok(stats) => stats.is_file(),
            Err(_) => false,
        })
    }
}

// ---------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------

/// Split a relative path into its container and last segment. The segment
/// keeps a trailing `/`.
fn split_last(rel: &str) -> (&str, &str) {
    let trimmed = rel.trim_end_matches('/');
    let idx = trimmed.rfind('/').unwrap_or(0);
    (&rel[..=idx], &rel[idx + 1..])
}

fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(METADATA);
    PathBuf::from(name)
}

/// Sidecars and temp files: what may be left in a container that is
/// otherwise empty.
fn is_internal_file(name: &str) -> bool {
    name.ends_with(METADATA) || (name.starts_with('.') && name.ends_with(".tmp"))
}

fn ensure_binary(representation: &Representation) -> HttpResult<()> {
    if representation.data_type == DataType::Binary {
        Ok(())
    } else {
        Err(binary_only())
    }
}

fn binary_only() -> HttpError {
    HttpError::UnsupportedMediaType("The file store only accepts binary data.".into())
}

fn not_a_container() -> HttpError {
    HttpError::MethodNotAllowed("The given path is not a valid container.".into())
}

async fn ensure_dir(dir: &Path) -> HttpResult<()> {
    match fs::symlink_metadata(dir).await {
        Ok(stats) if stats.is_dir() => Ok(()),
        _ => Err(not_a_container()),
    }
}

async fn remove_if_present(path: &Path) -> HttpResult<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(HttpError::internal(format!("{}: {err}", path.display()))),
    }
}

fn iri(value: &str) -> NamedNode {
    NamedNode::new_unchecked(value)
}

/// Description quads for a file or directory.
fn resource_quads(subject: &NamedNode, stats: &Metadata) -> Vec<Quad> {
    let mut quads = Vec::new();
    let mut add = |predicate: NamedNode, object: Term| {
        quads.push(Quad::new(subject.clone(), predicate, object, GraphName::DefaultGraph));
    };
    let rdf_type = rdf::TYPE.into_owned();

    if stats.is_dir() {
        add(rdf_type.clone(), iri(ldp::CONTAINER).into());
        add(rdf_type.clone(), iri(ldp::BASIC_CONTAINER).into());
    }
    add(rdf_type, iri(ldp::RESOURCE).into());
    add(
        iri(posix::SIZE),
        Literal::new_typed_literal(stats.len().to_string(), xsd::INTEGER).into(),
    );
    if let Ok(modified) = stats.modified() {
        let modified = DateTime::<Utc>::from(modified);
        add(
            iri(dcterms::MODIFIED),
            Literal::new_typed_literal(
                modified.to_rfc3339_opts(SecondsFormat::Millis, true),
                xsd::DATE_TIME,
            )
            .into(),
        );
        add(iri(posix::MTIME), mtime_literal(modified.timestamp_millis()).into());
    }
    quads
}

/// Modification time in hundreds of milliseconds: an integer when exact,
/// otherwise a double with up to two fraction digits.
fn mtime_literal(millis: i64) -> Literal {
    let sign = if millis < 0 { "-" } else { "" };
    let abs = millis.unsigned_abs();
    if abs % 100 == 0 {
        return Literal::new_typed_literal(format!("{sign}{}", abs / 100), xsd::INTEGER);
    }
    let fraction = format!("{:02}", abs % 100);
    Literal::new_typed_literal(
        format!("{sign}{}.{}", abs / 100, fraction.trim_end_matches('0')),
        xsd::DOUBLE,
    )
}
