//! Shared on-disk fixtures for dataset and resolver tests.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

pub const DATASET_A: &str = "63d0da07-0a4b-4ffd-844f-af75c02288e0";
pub const DATASET_B: &str = "1af6c4c5-278d-40ae-9e32-dc8192f8402a";

pub const ZONE_A1: &str = "fa719db8-31e9-49d1-9344-d4608ef6417e";
pub const ZONE_A2: &str = "b4d9ffe3-ab2d-4f18-b1c5-b4c3d9b2f6f7";
pub const ZONE_B1: &str = "c3e8b68b-f862-41bd-848c-6e2df28e4dd8";
pub const ZONE_B2: &str = "2411dbb6-e7bf-41fd-8898-83325a9c6e5a";

pub const IMAGE_PLEIADES: &str = "f9525e3bfbd081cd545261b3b5414eb88f689005";
pub const IMAGE_SPOT: &str = "75ad128196254e711ef7c9b129d1c59153098b18";
pub const IMAGE_SENTINEL: &str = "S2B_MSIL1C_20200212T025609_N0209_R003_T47DMH_20200212T054548";
pub const IMAGE_AERIAL: &str = "088dbf07-2879-4b23-af06-b3f4189fcae6";
pub const IMAGE_DEIMOS: &str = "d51636c2-e94d-422c-a034-82e4ff8fa7aa";
pub const IMAGE_VISION: &str = "4e15b4a3-ee52-4382-b8a8-7d492fb1a6ed";
pub const IMAGE_TERRASAR: &str = "5562b632-72c3-4c21-b24e-e0536d8b20c8";

pub const TILE_7C47: &str = "7c47df1097b349278c052e93e1d1903a";
pub const TILE_453E: &str = "453e41d218e071ccfb2d1c99ce23906a";
pub const TILE_0CC1: &str = "0cc175b9c0f1b6a831c399e269772661";
pub const TILE_92EB: &str = "92eb5ffee6ae2fec3ad71c777531578b";
pub const TILE_4A8A: &str = "4a8a08f09d37b73795649038408b5f33";

/// Not a decodable image, but drivers only ever look at paths.
const JPG: &[u8] = &[0xff, 0xd8, 0xff, 0xe0];

pub const TAXONOMY: &str = r#"{ "tag": { "class": {} } }"#;
pub const TAXONOMY_CONFLICT: &str = r#"{ "tags": { "class": {} } }"#;

pub const DATASET_A_SUMMARY: &str = r#"
{
  "targetZoom": 18,
  "datasetName": "Test PGML 1",
  "imageIds": [
    ["f9525e3bfbd081cd545261b3b5414eb88f689005",
     "75ad128196254e711ef7c9b129d1c59153098b18"],
    ["S2B_MSIL1C_20200212T025609_N0209_R003_T47DMH_20200212T054548",
     "088dbf07-2879-4b23-af06-b3f4189fcae6"]
  ],
  "zoneIds": [
    "fa719db8-31e9-49d1-9344-d4608ef6417e",
    "b4d9ffe3-ab2d-4f18-b1c5-b4c3d9b2f6f7"
  ],
  "creationDate": "2021-12-31T23:59:59.676066",
  "datasetId": "63d0da07-0a4b-4ffd-844f-af75c02288e0"
}
"#;

pub const DATASET_B_SUMMARY: &str = r#"
{
  "targetZoom": 14,
  "datasetName": "Test PGML 2",
  "imageIds": [
    ["d51636c2-e94d-422c-a034-82e4ff8fa7aa"],
    ["4e15b4a3-ee52-4382-b8a8-7d492fb1a6ed",
     "5562b632-72c3-4c21-b24e-e0536d8b20c8"]
  ],
  "zoneIds": [
    "c3e8b68b-f862-41bd-848c-6e2df28e4dd8",
    "2411dbb6-e7bf-41fd-8898-83325a9c6e5a"
  ],
  "creationDate": "2021-12-31T23:59:59.676066",
  "datasetId": "1af6c4c5-278d-40ae-9e32-dc8192f8402a"
}
"#;

pub const FEATURE_COLLECTION: &str = r#"
{
  "type": "FeatureCollection",
  "features": [
    {
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[92.7, 256], [92.8, 253.6], [86, 253.4], [85.9, 256], [92.7, 256]]]
      },
      "type": "Feature",
      "properties": {
        "last_modifier_id": "35e372a9-6b76-40c6-a3d5-1ee7183c3dc7",
        "comment": null,
        "orientation": -178.522,
        "tags": ["tag", "class"],
        "surface": 64.2146176930851,
        "kept_percentage": 0.09569366018406641,
        "image_id": "9ad5b20165e2873321bbc1f979c6669cdc451014",
        "dataset_id": "f16fff43-2535-4e34-afec-6404dcdcd545",
        "id": "record.6e73eff2-06f3-11ea-976a-b24c6cdc2bc0",
        "zone_id": "10187fa3-30df-4eb4-a1e9-6b1dcdc79951",
        "confidence": null,
        "angle": 2.16567500171822,
        "job_id": null,
        "created_at": "2019-11-14T15:28:38.813332",
        "modified_at": "2019-11-14T15:28:38.805320",
        "length": 15.8988469989003,
        "width": 4.06052237034644,
        "state": "ADDED",
        "record_id": "6e73eff2-06f3-11ea-976a-b2cdca212bc0",
        "image_2_id": null,
        "owner_id": "35e370a9-6b76-4ac6-a3d5-1eeb983c3dc7"
      }
    },
    {
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[0, 0], [0, 256], [256, 256], [256, 0], [0, 0]]]
      },
      "type": "Feature",
      "properties": {
        "kept_percentage": 1,
        "mask": true
      }
    }
  ]
}
"#;

pub fn write_file(root: &Path, relative: &str, contents: &[u8]) {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).unwrap();
	}
	fs::write(path, contents).unwrap();
}

pub fn touch_all(root: &Path, relatives: &[&str]) {
	for relative in relatives {
		write_file(root, relative, b"");
	}
}

/// Mixed-depth image tree used by the resolver walk tests.
pub fn complex_tree() -> TempDir {
	let dir = TempDir::new().unwrap();
	touch_all(
		dir.path(),
		&[
			"metadata.csv",
			"tree.json",
			"data/images.json",
			"data/images/dataset_1/aoi_0/labeled/tile_00.jpg",
			"data/images/dataset_1/aoi_0/labeled/tile_01.jpg",
			"data/images/dataset_1/aoi_0/labeled/tile_02.jpg",
			"data/images/dataset_1/aoi_0/labeled/tile_03.jpg",
			"data/images/dataset_1/aoi_0/labeled/tile_04.jpg",
			"data/images/dataset_1/aoi_0/labeled/tile_05.jpg",
			"data/images/dataset_1/aoi_0/labeled/tile_06.jpg",
			"data/images/dataset_1/aoi_0/labeled/tile_07.jpg",
			"data/images/dataset_1/aoi_0/simulated/tile_aa.jpg",
			"data/images/dataset_1/aoi_0/simulated/tile_ab.jpg",
			"data/images/dataset_1/aoi_0/simulated/tile_ac.jpg",
			"data/images/dataset_1/aoi_0/simulated/tile_ad.jpg",
			"data/images/dataset_1/aoi_0/simulated/tile_ae.jpg",
			"data/images/dataset_1/aoi_0/simulated/tile_af.jpg",
			"data/images/dataset_1/aoi_3/labeled/tile_8.jpg",
			"data/images/dataset_1/aoi_3/labeled/tile_9.jpg",
			"data/images/dataset_1/aoi_3/labeled/tile_10.jpg",
			"data/images/dataset_1/aoi_3/labeled/tile_11.jpg",
			"data/images/dataset_1/aoi_3/labeled/tile_12.jpg",
			"data/images/dataset_1/aoi_3/labeled/tile_13.jpg",
			"data/images/dataset_1/aoi_3/labeled/tile_14.jpg",
			"data/images/dataset_1/aoi_3/labeled/tile_15.jpg",
			"data/images/dataset_1/aoi_3/simulated/tile_ba.jpg",
			"data/images/dataset_1/aoi_3/simulated/tile_bb.jpg",
			"data/images/dataset_1/aoi_3/simulated/tile_bc.jpg",
			"data/images/dataset_1/aoi_3/simulated/tile_bd.jpg",
			"data/images/dataset_1/aoi_3/simulated/tile_be.jpg",
			"data/images/dataset_1/aoi_3/simulated/tile_bf.jpg",
			"data/images/dataset_0/labeled/tile_20.jpg",
			"data/images/dataset_0/labeled/tile_21.jpg",
			"data/images/dataset_0/labeled/tile_22.jpg",
			"data/images/dataset_0/labeled/tile_23.jpg",
			"data/images/dataset_0/labeled/tile_24.jpg",
			"data/images/dataset_0/labeled/tile_25.jpg",
			"data/images/dataset_0/labeled/tile_26.jpg",
			"data/images/dataset_0/labeled/tile_27.jpg",
			"data/images/dataset_3/tile_30.jpg",
			"data/images/dataset_3/tile_31.jpg",
			"data/images/dataset_3/tile_32.jpg",
			"data/images/dataset_3/tile_33.jpg",
			"data/images/dataset_3/tile_34.jpg",
			"data/images/dataset_3/added/tile_ca.jpg",
			"data/images/dataset_3/added/tile_cb.jpg",
			"data/images/dataset_3/added/tile_cc.jpg",
		],
	);
	dir
}

/// Image/label tree where only some tiles have a matching annotation.
pub fn loose_pattern_tree() -> TempDir {
	let dir = TempDir::new().unwrap();
	touch_all(
		dir.path(),
		&[
			"metadata.csv",
			"tree.json",
			"data/images.json",
			"data/images/dataset_1/aoi_0/labeled/tile_00.jpg",
			"data/images/dataset_1/aoi_0/labeled/tile_01.jpg",
			"data/images/dataset_1/aoi_0/labeled/tile_00.json",
			"data/images/dataset_1/aoi_0/labeled/tile_01.geojson",
			"data/images/dataset_1/aoi_0/simulated/tile_00.jpg",
			"data/images/dataset_1/aoi_0/simulated/tile_01.jpg",
			"data/images/dataset_1/aoi_3/labeled/tile_00.jpg",
			"data/images/dataset_1/aoi_3/labeled/tile_01.jpg",
			"data/images/dataset_1/aoi_3/simulated/tile_00.jpg",
			"data/images/dataset_1/aoi_3/simulated/tile_01.jpg",
			"data/images/dataset_0/labeled/prior/tile_00.jpg",
			"data/images/dataset_0/labeled/prior/tile_01.jpg",
			"data/images/dataset_0/labeled/posterior/tile_00.jpg",
			"data/images/dataset_0/labeled/posterior/tile_01.jpg",
			"data/images/dataset_0/labels/tile_00.json",
			"data/images/dataset_0/labels/tile_01.json",
			"data/labels/dataset_1/aoi_0/simulated/tile_00.json",
			"data/labels/dataset_1/aoi_0/simulated/tile_01.json",
			"data/labels/dataset_1/aoi_3/labeled/tile_00.json",
			"data/labels/dataset_1/aoi_3/labeled/tile_01.json",
			"data/labels/dataset_1/aoi_3/simulated/tile_00.json",
			"data/labels/dataset_1/aoi_3/simulated/tile_01.json",
			"data/labels/dataset_0/labeled/tile_00.json",
			"data/labels/dataset_0/labeled/tile_01.json",
		],
	);
	dir
}

/// Image/label tree where every tile has a matching annotation, plus decoy
/// files on the wrong side of the split.
pub fn strict_pattern_tree() -> TempDir {
	let dir = TempDir::new().unwrap();
	touch_all(
		dir.path(),
		&[
			"metadata.csv",
			"tree.json",
			"data/images.json",
			"data/images/dataset_1/aoi_0/labeled/tile_00.jpg",
			"data/images/dataset_1/aoi_0/labeled/tile_01.jpg",
			"data/images/dataset_1/aoi_0/simulated/tile_00.jpg",
			"data/images/dataset_1/aoi_0/simulated/tile_01.jpg",
			"data/images/dataset_1/aoi_3/labeled/tile_00.jpg",
			"data/images/dataset_1/aoi_3/labeled/tile_01.jpg",
			"data/images/dataset_1/aoi_3/simulated/tile_00.jpg",
			"data/images/dataset_1/aoi_3/simulated/tile_01.jpg",
			"data/images/dataset_0/labeled/tile_00.jpg",
			"data/images/dataset_0/labeled/tile_01.jpg",
			"data/images/dataset_0/labels/tile_00.json",
			"data/images/dataset_0/labels/tile_01.json",
			"data/labels/dataset_1/aoi_0/labeled/tile_00.json",
			"data/labels/dataset_1/aoi_0/labeled/tile_01.json",
			"data/labels/dataset_1/aoi_0/simulated/tile_00.json",
			"data/labels/dataset_1/aoi_0/simulated/tile_01.json",
			"data/labels/dataset_1/aoi_3/labeled/tile_00.json",
			"data/labels/dataset_1/aoi_3/labeled/tile_01.json",
			"data/labels/dataset_1/aoi_3/simulated/tile_00.json",
			"data/labels/dataset_1/aoi_3/simulated/tile_01.json",
			"data/labels/dataset_0/labeled/tile_00.json",
			"data/labels/dataset_0/labeled/tile_01.json",
			"data/labels/dataset_0/images/tile_00.jpg",
			"data/labels/dataset_0/images/tile_01.jpg",
		],
	);
	dir
}

fn playground_dataset_a(root: &Path, with_summary: bool) {
	write_file(root, &format!("{DATASET_A}/taxonomy.json"), TAXONOMY.as_bytes());
	if with_summary {
		write_file(
			root,
			&format!("{DATASET_A}/dataset_summary.json"),
			DATASET_A_SUMMARY.as_bytes(),
		);
	}
	for (zone, image, tile) in [
		(ZONE_A1, IMAGE_PLEIADES, TILE_7C47),
		(ZONE_A1, IMAGE_SPOT, TILE_7C47),
		(ZONE_A2, IMAGE_SENTINEL, TILE_453E),
		(ZONE_A2, IMAGE_AERIAL, TILE_0CC1),
	] {
		write_file(
			root,
			&format!("{DATASET_A}/samples/{zone}/{image}/{tile}.jpg"),
			JPG,
		);
	}
	// World-file sidecar that must never match the tile pattern.
	write_file(
		root,
		&format!("{DATASET_A}/samples/{ZONE_A2}/{IMAGE_SENTINEL}/{TILE_453E}.jgw"),
		b"",
	);
	for (zone, tile) in [
		(ZONE_A1, TILE_7C47),
		(ZONE_A2, TILE_453E),
		(ZONE_A2, TILE_0CC1),
	] {
		write_file(
			root,
			&format!("{DATASET_A}/labels/{zone}/{tile}.json"),
			FEATURE_COLLECTION.as_bytes(),
		);
	}
	// Zones named with non-v4 UUIDs, filtered out by the zone pattern.
	for path in [
		format!("{DATASET_A}/samples/99aa890e-4d9a-11ea-92ec-a0481c91ddca/{IMAGE_SENTINEL}/{TILE_453E}.jpg"),
		format!("{DATASET_A}/samples/99aa890e-4d9a-11ea-92ec-a0481c91ddca/{IMAGE_AERIAL}/{TILE_0CC1}.jpg"),
		format!("{DATASET_A}/samples/732af79d-f68d-393b-b2f8-9239bcd62a27/{IMAGE_PLEIADES}/{TILE_7C47}.jpg"),
		format!("{DATASET_A}/samples/732af79d-f68d-393b-b2f8-9239bcd62a27/{IMAGE_SPOT}/88aff0a92b21b86460bfd4474ab1626a.jpg"),
		format!("{DATASET_A}/samples/f9a071b2-7c2d-5987-b251-f386a554e28a/{IMAGE_SENTINEL}/{TILE_453E}.jpg"),
	] {
		write_file(root, &path, JPG);
	}
	for path in [
		format!("{DATASET_A}/labels/732af79d-f68d-393b-b2f8-9239bcd62a27/{TILE_7C47}.json"),
		format!("{DATASET_A}/labels/732af79d-f68d-393b-b2f8-9239bcd62a27/88aff0a92b21b86460bfd4474ab1626a.json"),
		format!("{DATASET_A}/labels/f9a071b2-7c2d-5987-b251-f386a554e28a/{TILE_453E}.json"),
	] {
		write_file(root, &path, FEATURE_COLLECTION.as_bytes());
	}
}

fn playground_dataset_b(root: &Path, with_summary: bool, conflict_taxonomy: bool) {
	let taxonomy = if conflict_taxonomy {
		TAXONOMY_CONFLICT
	} else {
		TAXONOMY
	};
	write_file(root, &format!("{DATASET_B}/taxonomy.json"), taxonomy.as_bytes());
	if with_summary {
		write_file(
			root,
			&format!("{DATASET_B}/dataset_summary.json"),
			DATASET_B_SUMMARY.as_bytes(),
		);
	}
	// Extension-less decoy next to a real tile.
	write_file(
		root,
		&format!("{DATASET_B}/samples/{ZONE_B1}/{IMAGE_DEIMOS}/92eb5ffee6ae2fec3ad71c777531578f"),
		b"",
	);
	for (zone, image, tile) in [
		(ZONE_B1, IMAGE_DEIMOS, TILE_92EB),
		// 33 hex digits, one too many for the tile pattern.
		(ZONE_B2, IMAGE_VISION, "04a8a08f09d37b73795649038408b5f33"),
		(ZONE_B2, IMAGE_VISION, TILE_4A8A),
		(ZONE_B2, IMAGE_TERRASAR, TILE_4A8A),
	] {
		write_file(
			root,
			&format!("{DATASET_B}/samples/{zone}/{image}/{tile}.jpg"),
			JPG,
		);
	}
	write_file(
		root,
		&format!("{DATASET_B}/labels/{ZONE_B1}/92eb5ffee6ae2fec3ad71c777531578f"),
		b"",
	);
	for (zone, tile) in [
		(ZONE_B1, TILE_92EB),
		(ZONE_B2, "04a8a08f09d37b73795649038408b5f33"),
		(ZONE_B2, TILE_4A8A),
	] {
		write_file(
			root,
			&format!("{DATASET_B}/labels/{zone}/{tile}.json"),
			FEATURE_COLLECTION.as_bytes(),
		);
	}
}

/// Datasets named with non-v4 UUIDs, filtered out by the dataset pattern.
fn playground_out_datasets(root: &Path) {
	let names = [
		"d53187c6-4d99-11ea-92ec-a0481c91ddca",
		"bb959eb8-692f-3225-9506-e885ac3770bf",
		"6e9a3589-d6c8-534e-ada1-b769aeec2fe2",
	];
	write_file(
		root,
		&format!("{}/taxonomy.json", names[0]),
		TAXONOMY_CONFLICT.as_bytes(),
	);
	for name in names {
		for (zone, image, tile) in [
			(ZONE_B1, IMAGE_DEIMOS, TILE_92EB),
			(ZONE_B2, IMAGE_VISION, "04a8a08f09d37b73795649038408b5f33"),
			(ZONE_B2, IMAGE_VISION, TILE_4A8A),
			(ZONE_B2, IMAGE_TERRASAR, "8277e0910d750195b448797616e091ad"),
		] {
			write_file(root, &format!("{name}/samples/{zone}/{image}/{tile}.jpg"), JPG);
		}
	}
	// The uuid-3 dataset carries no labels at all.
	for name in [names[0], names[2]] {
		for (zone, tile) in [
			(ZONE_B1, TILE_92EB),
			(ZONE_B2, "04a8a08f09d37b73795649038408b5f33"),
			(ZONE_B2, TILE_4A8A),
			(ZONE_B2, "8277e0910d750195b448797616e091ad"),
		] {
			write_file(
				root,
				&format!("{name}/labels/{zone}/{tile}.json"),
				FEATURE_COLLECTION.as_bytes(),
			);
		}
	}
}

/// Two well-formed datasets plus decoys that every filter must reject.
pub fn playground_tree() -> TempDir {
	let dir = TempDir::new().unwrap();
	playground_dataset_a(dir.path(), true);
	playground_dataset_b(dir.path(), true, false);
	playground_out_datasets(dir.path());
	dir
}

/// Base tree plus one image (and its tile) absent from the summary.
pub fn playground_tree_missing_image() -> TempDir {
	let dir = playground_tree();
	write_file(
		dir.path(),
		&format!(
			"{DATASET_A}/samples/{ZONE_A1}/75ad128156ef4e711ef7c9b129d1c59153098b18/7c47df10ef5649278c052e93e1d1903a.jpg"
		),
		JPG,
	);
	write_file(
		dir.path(),
		&format!("{DATASET_A}/labels/{ZONE_A1}/7c47df10ef5649278c052e93e1d1903a.json"),
		FEATURE_COLLECTION.as_bytes(),
	);
	dir
}

/// Base tree plus one zone absent from the summary.
pub fn playground_tree_missing_zone() -> TempDir {
	let dir = playground_tree();
	let zone = "2411ef56-e7bf-41fd-8898-83325a9c6e5a";
	write_file(
		dir.path(),
		&format!(
			"{DATASET_B}/samples/{zone}/4e1ef5a3-ee52-4382-b8a8-7d492fb1a6ed/4a8a08f0ef56b73795649038408b5f33.jpg"
		),
		JPG,
	);
	write_file(
		dir.path(),
		&format!("{DATASET_B}/labels/{zone}/4a8a08f0ef56b73795649038408b5f33.json"),
		FEATURE_COLLECTION.as_bytes(),
	);
	dir
}

/// Base tree where one dataset carries no summary file.
pub fn playground_tree_missing_dataset() -> TempDir {
	let dir = TempDir::new().unwrap();
	playground_dataset_a(dir.path(), true);
	playground_dataset_b(dir.path(), false, false);
	playground_out_datasets(dir.path());
	dir
}

/// Base tree with no summary file anywhere.
pub fn playground_tree_missing_summaries() -> TempDir {
	let dir = TempDir::new().unwrap();
	playground_dataset_a(dir.path(), false);
	playground_dataset_b(dir.path(), false, false);
	playground_out_datasets(dir.path());
	dir
}

/// Base tree where the two indexed datasets disagree on their taxonomy.
pub fn playground_tree_conflict() -> TempDir {
	let dir = TempDir::new().unwrap();
	playground_dataset_a(dir.path(), false);
	playground_dataset_b(dir.path(), false, true);
	playground_out_datasets(dir.path());
	dir
}
