//! Renderers for the individual statements of the specification grammar.

use camino::Utf8Path;

use crate::color::{fill_color, stroke_color};
use crate::dataset::{DatasetBatch, DatasetDescriptor, DatasetKind, FieldDescriptor};
use crate::naming::{camel_case, pascal_case};

use super::DeploymentTarget;

const TAB: &str = "  ";
const SPATIAL_REFERENCE: u32 = 4326;
const FILL_OPACITY: &str = "0.5";
const STROKE_OPACITY: &str = "1";
const RASTER_TAG: &str = "Raster";
const UNTYPED_GEOMETRY_TAG: &str = "Geometry";
/// Identifier of the OpenStreetMap tile layer declared once per instance.
const BASE_LAYER: &str = "osmBaseLayer";
const BASE_LAYER_URL: &str = "https://{a-c}.tile.openstreetmap.org/{z}/{x}/{y}.png";

pub(crate) fn header(instance: &str, deployment: &DeploymentTarget) -> String {
    let entries: Vec<String> = deployment
        .entries()
        .into_iter()
        .map(|(key, value)| format!("{TAB}{} {}", quoted(key), quoted(&value)))
        .collect();
    format!(
        "CREATE GIS {instance} USING {SPATIAL_REFERENCE};\n\
         USE GIS {instance};\n\n\
         CONFIG DEPLOYMENT (\n{}\n);\n\n\
         CREATE TILE LAYER {BASE_LAYER} AS \"OpenStreetMap\" (\n{TAB}url {}\n);\n\n",
        entries.join(",\n"),
        quoted(BASE_LAYER_URL)
    )
}

pub(crate) fn trailer(instance: &str) -> String {
    format!("GENERATE GIS {instance};\n")
}

pub(crate) fn entity(dataset: &DatasetDescriptor) -> String {
    let mut fields = vec![format!("{TAB}id Long IDENTIFIER DISPLAY_STRING")];
    fields.extend(dataset.schema.iter().map(entity_field));
    format!(
        "CREATE ENTITY {} (\n{}\n);\n\n",
        pascal_case(&dataset.name),
        fields.join(",\n")
    )
}

fn entity_field(field: &FieldDescriptor) -> String {
    let source = if field.name == "id" { "id2" } else { field.name.as_str() };
    format!("{TAB}{} {}", camel_case(source), field_type(&field.field_type))
}

fn field_type(source: &str) -> &str {
    match source {
        "Number" => "Long",
        "String" => "String",
        other => other,
    }
}

pub(crate) fn style(dataset: &DatasetDescriptor, directory: &Utf8Path) -> String {
    let name = style_name(dataset);
    if dataset.has_style {
        let path = directory.join(format!("{}.sld", dataset.file_stem()));
        return format!("CREATE SLD STYLE {name} {};\n\n", quoted(path.as_str()));
    }
    format!(
        "CREATE STYLE {name} (\n\
         {TAB}geometryType {},\n\
         {TAB}fillColor {},\n\
         {TAB}strokeColor {},\n\
         {TAB}fillOpacity {FILL_OPACITY},\n\
         {TAB}strokeOpacity {STROKE_OPACITY}\n\
         );\n\n",
        geometry_tag(dataset),
        fill_color(&dataset.name),
        stroke_color(&dataset.name),
    )
}

fn geometry_tag(dataset: &DatasetDescriptor) -> &'static str {
    match dataset.kind {
        DatasetKind::Raster => RASTER_TAG,
        DatasetKind::Vector => dataset
            .geometry_type()
            .map_or(UNTYPED_GEOMETRY_TAG, |geometry| geometry.as_str()),
    }
}

pub(crate) fn layer(dataset: &DatasetDescriptor) -> String {
    let source = match dataset.kind {
        DatasetKind::Vector => pascal_case(&dataset.name),
        DatasetKind::Raster => format!("RASTER {}", quoted(&dataset.file_name)),
    };
    format!(
        "CREATE WMS LAYER {} AS {} (\n{TAB}{source} {}\n);\n\n",
        layer_name(dataset),
        quoted(&dataset.name),
        style_name(dataset)
    )
}

pub(crate) fn map(batch: &DatasetBatch) -> String {
    let mut layers = vec![format!("{TAB}{BASE_LAYER} IS_BASE_LAYER")];
    layers.extend(
        batch
            .datasets
            .iter()
            .map(|dataset| format!("{TAB}{}", layer_name(dataset))),
    );
    format!(
        "CREATE MAP {}Map AS {} (\n{}\n);\n\n",
        batch.identifier(),
        quoted(batch.label()),
        layers.join(",\n")
    )
}

fn style_name(dataset: &DatasetDescriptor) -> String {
    format!("{}Style", camel_case(&dataset.name))
}

fn layer_name(dataset: &DatasetDescriptor) -> String {
    format!("{}Layer", camel_case(&dataset.name))
}

fn quoted(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
