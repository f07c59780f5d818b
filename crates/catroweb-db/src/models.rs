//! Database row types. These map directly to SQLite rows and stay
//! independent of the catroweb-types API models.

use catroweb_types::like::LikeType;

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub enabled: bool,
    pub super_admin: bool,
    pub upload_token: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct ProgramRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub created_at: String,
}

/// Edge from an external Scratch program to the local program remixing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScratchRemixRelationRow {
    pub scratch_parent_id: i64,
    pub catrobat_child_id: String,
}

#[derive(Debug, Clone)]
pub struct ProgramLikeRow {
    pub program_id: String,
    pub user_id: String,
    pub like_type: LikeType,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct MediaPackageRow {
    pub id: i64,
    pub name: String,
    pub name_url: String,
}

#[derive(Debug, Clone)]
pub struct MediaCategoryRow {
    pub id: i64,
    pub name: String,
    pub package_id: i64,
    pub priority: i64,
}

/// A media file joined with the names of its category and package.
#[derive(Debug, Clone)]
pub struct MediaFileRow {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub category_name: String,
    pub package_name: String,
    pub extension: String,
    pub author: String,
    pub flavors: String,
    pub active: bool,
    pub downloads: i64,
    pub category_priority: i64,
}

impl MediaFileRow {
    pub fn flavor_list(&self) -> Vec<String> {
        self.flavors
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Files without any flavor are shared by all flavors.
    pub fn visible_to(&self, flavor: &str) -> bool {
        let flavors = self.flavor_list();
        flavors.is_empty() || flavors.iter().any(|f| f == flavor)
    }
}
