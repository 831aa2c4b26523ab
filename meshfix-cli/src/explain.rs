//! Rule explanations for the `meshfix explain` and `meshfix list-rules`
//! commands.
//!
//! Severity and fixability are not repeated here; they come from the rule
//! registry so the two can never disagree.

/// Human-facing description of one validation rule.
#[derive(Debug, Clone)]
pub struct RuleExplanation {
    /// Rule id as it appears in reports (e.g., "surface_orientation").
    pub id: &'static str,
    pub title: &'static str,
    /// The defect this rule looks for.
    pub description: &'static str,
    /// How the rule decides.
    pub method: &'static str,
    /// What to do about a failure.
    pub remediation: &'static str,
    /// Built-in fixer action, when one exists.
    pub fixer: Option<&'static str>,
}

/// Catalog of every built-in rule, in execution order.
pub static RULE_CATALOG: &[RuleExplanation] = &[
    RuleExplanation {
        id: "surface_orientation",
        title: "Surface Orientation",
        description: "Cells wound clockwise. Solvers assume counter-clockwise cells in 2D and \
                      will see negative volumes otherwise.",
        method: "Signed area of every triangle (cross product) and quad (shoelace). A cell \
                 fails when its signed area is negative.",
        remediation: "Run `meshfix repair --apply` to reverse the node order of the flagged \
                      cells, or re-export the mesh with consistent winding.",
        fixer: Some("reorient: reverse node order of each flagged cell"),
    },
    RuleExplanation {
        id: "negative_jacobians",
        title: "Negative Jacobians",
        description: "Degenerate or self-intersecting cells.",
        method: "A cell fails when its absolute area is within the collinearity epsilon. A \
                 quad also fails when either pair of opposite edges crosses (bow-tie). \
                 Winding alone is not penalized here.",
        remediation: "Regenerate the affected region. Bow-tie quads usually come from a node \
                      ordering bug in the exporter.",
        fixer: None,
    },
    RuleExplanation {
        id: "duplicate_elements",
        title: "Duplicate Elements",
        description: "Two cells with the same node set, whatever their winding.",
        method: "Sort each cell's nodes into a canonical key and flag every occurrence after \
                 the first.",
        remediation: "Run `meshfix repair --apply`. Set `prefer = \"last\"` in the plan to keep \
                      the last copy instead of the first.",
        fixer: Some("dedupe: re-derive duplicate groups and remove all but one"),
    },
    RuleExplanation {
        id: "multiple_edges",
        title: "Multiple Edges",
        description: "A cell that lists the same edge more than once.",
        method: "Count each canonical edge within a cell's own edge ring. Any multiplicity \
                 above one is flagged.",
        remediation: "Run `meshfix repair --apply` to trim oversubscribed edges, then rebuild \
                      the folded cells.",
        fixer: Some("dedupe: keep the two largest cells on edges shared by more than two"),
    },
    RuleExplanation {
        id: "nonmanifold",
        title: "Non-manifold Topology",
        description: "Edges shared by more than two cells, and star-like nodes.",
        method: "Edge degree above two, or node incidence above mean + 5 sigma and at least \
                 eight cells.",
        remediation: "Remove stray cells around the flagged edges. The multiple_edges fixer \
                      trims edges shared by more than two cells.",
        fixer: None,
    },
    RuleExplanation {
        id: "overlapping_elements",
        title: "Overlapping Elements",
        description: "Non-adjacent cells that overlap or contain one another. Disabled by \
                      default.",
        method: "Spatial grid candidates, shared-edge pairs skipped, then boundary edge \
                 intersection and mutual centroid containment.",
        remediation: "Enable with `--enable overlapping_elements`. Overlaps usually mean two \
                      meshed regions were merged without conforming the interface.",
        fixer: None,
    },
    RuleExplanation {
        id: "uncovered_faces",
        title: "Uncovered Faces",
        description: "Holes: degree-1 edges that are not part of the declared boundary.",
        method: "Degree-1 edges absent from the boundary edge set built from the line \
                 elements. Skipped when the mesh carries no lines.",
        remediation: "Close the hole, or add the missing boundary line elements.",
        fixer: None,
    },
    RuleExplanation {
        id: "missing_internal_faces",
        title: "Missing Internal Faces",
        description: "T-junctions and non-conformal interfaces.",
        method: "Interior (non-boundary) edges whose degree is not exactly two. Skipped when \
                 the mesh carries no lines.",
        remediation: "Conform the interface so both sides share the same nodes.",
        fixer: None,
    },
    RuleExplanation {
        id: "missing_physical_groups",
        title: "Missing Physical Groups",
        description: "Required physical groups absent from the mesh.",
        method: "Every name in `required_groups` must be in the group catalog. When \
                 `group_dims` is set, dimensions must match too. Skipped without a catalog \
                 unless `strict_if_no_field_data` is set.",
        remediation: "Define the groups in the mesher and re-export.",
        fixer: None,
    },
    RuleExplanation {
        id: "bl_continuity",
        title: "Boundary-layer Continuity",
        description: "Broken near-wall quad layers.",
        method: "Presence check only: skipped without quads or without the wall line tag.",
        remediation: "Check the inflation layer settings on the wall.",
        fixer: None,
    },
    RuleExplanation {
        id: "two_single_edges",
        title: "Two Single Edges",
        description: "Pairs of dangling edges that share a node.",
        method: "Group degree-1 edges by node and report each pair that meets at one.",
        remediation: "Usually harmless on the outer boundary. Inside the domain it points at \
                      a slit or a missing cell.",
        fixer: None,
    },
    RuleExplanation {
        id: "tiny_elements",
        title: "Tiny Elements",
        description: "Cells far smaller than the rest of the mesh.",
        method: "Area below `tiny_area_rel` times the mean cell area, or below \
                 `tiny_area_abs`.",
        remediation: "Collapse or merge the slivers, or relax the thresholds.",
        fixer: None,
    },
    RuleExplanation {
        id: "min_angle_tris",
        title: "Minimum Triangle Angle",
        description: "Triangles with a very sharp corner.",
        method: "Smallest interior angle below `min_angle_deg`.",
        remediation: "Refine or smooth the region. Sharp triangles hurt gradient accuracy.",
        fixer: None,
    },
    RuleExplanation {
        id: "quad_skewness_orthogonality",
        title: "Quad Skewness",
        description: "Quads whose corners stray far from right angles.",
        method: "Largest deviation of an interior angle from 90 degrees, above \
                 `quad_skew_p95` times 90.",
        remediation: "Smooth the quad region or switch the block to triangles.",
        fixer: None,
    },
    RuleExplanation {
        id: "grading_spikes",
        title: "Grading Spikes",
        description: "Abrupt size jumps between neighbouring cells.",
        method: "For every edge shared by two cells, the ratio of the square roots of their \
                 areas above `grading_ratio_max`.",
        remediation: "Lower the growth rate in the mesher.",
        fixer: None,
    },
    RuleExplanation {
        id: "first_layer_height",
        title: "First Layer Height",
        description: "Near-wall cell size against a target. Disabled by default.",
        method: "Informational: reports sample percentiles when `first_layer_target` is set \
                 and quads exist.",
        remediation: "Adjust the first layer thickness in the mesher.",
        fixer: None,
    },
    RuleExplanation {
        id: "boundary_coverage",
        title: "Boundary Coverage",
        description: "The wall line tag exists but covers nothing.",
        method: "The `wall_name` line tag must list at least one line. Skipped when the tag \
                 is absent.",
        remediation: "Tag the wall lines in the mesher.",
        fixer: None,
    },
    RuleExplanation {
        id: "untagged_entities",
        title: "Untagged Entities",
        description: "Cells that belong to no cell tag.",
        method: "Unified cell ids (quads offset by the triangle count) missing from every \
                 cell tag.",
        remediation: "Assign the cells to a physical surface.",
        fixer: None,
    },
];

/// Case-insensitive lookup; hyphens match underscores.
pub fn lookup_rule(query: &str) -> Option<&'static RuleExplanation> {
    let normalized = query.trim().to_lowercase().replace('-', "_");
    RULE_CATALOG.iter().find(|rule| rule.id == normalized)
}

pub fn list_rule_ids() -> Vec<&'static str> {
    RULE_CATALOG.iter().map(|r| r.id).collect()
}
